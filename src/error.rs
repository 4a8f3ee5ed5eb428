use thiserror::Error;

/// Error contract for the ledger, transaction store and dashboard layers.
///
/// Validation and conflict failures are rejected before any state change;
/// not-found covers ids that do not exist *for the calling owner*, so one
/// owner can never probe another owner's data.
#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;
