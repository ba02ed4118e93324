//! Error types for remote index and archive access.

use thiserror::Error;

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur while talking to the remote archive source.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Ref or tree resolution failed (bad ref, non-success status,
    /// or a response missing the tree identifier).
    #[error("remote lookup failed: {message}")]
    Lookup {
        /// What went wrong.
        message: String,
    },

    /// Both the direct download and the blob fallback failed.
    #[error("archive fetch failed for {path}: {message}")]
    Fetch {
        /// Repository path of the archive.
        path: String,
        /// Combined failure description.
        message: String,
    },

    /// The blob API returned a payload in an unexpected encoding.
    #[error("unexpected blob encoding {encoding:?} for {path}")]
    Encoding {
        /// Repository path of the archive.
        path: String,
        /// The encoding the blob API reported.
        encoding: String,
    },

    /// Transport-level failure before any HTTP status was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// A response body could not be decoded into the expected shape.
    #[error("malformed response from {url}: {message}")]
    Malformed {
        /// The URL that produced the response.
        url: String,
        /// Decode failure description.
        message: String,
    },
}

impl RemoteError {
    /// Creates a lookup error.
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup {
            message: message.into(),
        }
    }

    /// Creates a fetch error for an archive path.
    pub fn fetch(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            url: url.into(),
            message: message.into(),
        }
    }
}
