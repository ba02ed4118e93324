//! Error types for catalog building.

use thiserror::Error;
use worldsync_remote::RemoteError;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while building a catalog.
///
/// Per-archive failures are caught inside the build loop and degrade
/// the catalog; only ref resolution, tree listing and cancellation are
/// fatal.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Remote lookup or fetch failure.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// An archive's bytes could not be read as a ZIP container.
    #[error("archive read error: {0}")]
    Archive(String),

    /// The build was cancelled via its [`CancelFlag`](crate::CancelFlag).
    #[error("catalog build cancelled")]
    Cancelled,
}
