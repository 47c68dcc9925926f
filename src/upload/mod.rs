// src/upload/mod.rs
//! Hand the current rows to Dropbox.
//!
//! Authorization uses the OAuth implicit grant: the user is sent to
//! [`auth::authorize_url`] and comes back with the token in the URL fragment,
//! recovered by [`auth::access_token_from_redirect`]. [`dropbox::DropboxClient`]
//! then makes sure the target folder exists and overwrites
//! `<folder>/table-data.json`.

pub mod auth;
pub mod dropbox;

use thiserror::Error;

pub use auth::{access_token_from_redirect, authorize_url};
pub use dropbox::DropboxClient;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No access token found in URL")]
    MissingToken,

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The caller should send the user through authorization again.
    #[error("Your Dropbox access has expired. Please re-authorize.")]
    TokenExpired,

    #[error("Could not upload to Dropbox: {summary}")]
    Api { summary: String },

    #[error("Could not create folder: {summary}")]
    CreateFolder { summary: String },

    #[error("There is no table data to upload")]
    NoData,

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}
