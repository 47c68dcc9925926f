// src/config.rs
use std::env;

pub const APP_KEY_VAR: &str = "TABLEPASTE_DROPBOX_APP_KEY";
pub const TOKEN_VAR: &str = "TABLEPASTE_DROPBOX_TOKEN";
pub const REDIRECT_URI_VAR: &str = "TABLEPASTE_REDIRECT_URI";
pub const UPLOAD_PATH_VAR: &str = "TABLEPASTE_UPLOAD_PATH";

const APP_KEY_PLACEHOLDER: &str = "YOUR_APP_KEY_HERE";
const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/";
const DEFAULT_UPLOAD_PATH: &str = "/tablepaste";

/// Settings for the upload collaborator. Parsing needs none of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Dropbox app key, `None` when unset, blank or still the placeholder.
    pub app_key: Option<String>,
    pub access_token: Option<String>,
    pub redirect_uri: String,
    pub upload_path: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            app_key: non_blank(APP_KEY_VAR).filter(|key| key != APP_KEY_PLACEHOLDER),
            access_token: non_blank(TOKEN_VAR),
            redirect_uri: non_blank(REDIRECT_URI_VAR)
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            upload_path: non_blank(UPLOAD_PATH_VAR)
                .unwrap_or_else(|| DEFAULT_UPLOAD_PATH.to_string()),
        }
    }
}
