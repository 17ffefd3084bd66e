use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] travellocal_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("{0}")]
    Remote(String),
    #[error("Login is required. Run `travellocal auth set-token <TOKEN>` first.")]
    LoginRequired,
    #[error("Review {0} was written by another user")]
    NotReviewOwner(i64),
}

impl CliError {
    /// Core failure shown the way screens show it, falling back to `fallback`.
    pub fn from_core(error: travellocal_core::Error, fallback: &str) -> Self {
        if error.is_auth_required() {
            Self::LoginRequired
        } else if error.is_remote_failure() {
            Self::Remote(error.user_message(fallback))
        } else {
            Self::Core(error)
        }
    }
}
