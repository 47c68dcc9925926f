// src/upload/auth.rs
use url::{form_urlencoded, Url};

use super::UploadError;

const AUTHORIZE_ENDPOINT: &str = "https://www.dropbox.com/oauth2/authorize";

/// Implicit-grant authorization URL; Dropbox redirects back with `#access_token=...`.
pub fn authorize_url(app_key: &str, redirect_uri: &str) -> Result<Url, UploadError> {
    let url = Url::parse_with_params(
        AUTHORIZE_ENDPOINT,
        &[
            ("client_id", app_key),
            ("response_type", "token"),
            ("redirect_uri", redirect_uri),
        ],
    )?;
    Ok(url)
}

/// Pull `access_token` out of the fragment of the URL Dropbox redirected to.
pub fn access_token_from_redirect(redirect: &str) -> Result<String, UploadError> {
    let url = Url::parse(redirect)?;
    let fragment = url.fragment().ok_or(UploadError::MissingToken)?;
    form_urlencoded::parse(fragment.as_bytes())
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
        .ok_or(UploadError::MissingToken)
}
