//! Error types for plan execution.

use crate::db::DbError;
use thiserror::Error;
use worldsync_catalog::UnsupportedModeError;
use worldsync_remote::RemoteError;

/// Result type for apply operations.
pub type ApplyResult<T> = Result<T, ApplyError>;

/// Errors that can occur while applying a plan.
///
/// Unlike catalog building, nothing here is recoverable: a step that
/// cannot proceed fails the whole plan, which is then rolled back.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// An unrecognized apply mode string was requested.
    #[error(transparent)]
    UnsupportedMode(#[from] UnsupportedModeError),

    /// A step's recorded entry is gone and no SQL entry remains in its
    /// archive.
    #[error("no SQL entry in {archive} for table `{table}`")]
    MissingEntry {
        /// Table the step was reloading.
        table: String,
        /// Repository path of the archive.
        archive: String,
    },

    /// A step's archive bytes could not be read as a ZIP container.
    #[error("archive {path} could not be read: {message}")]
    Archive {
        /// Repository path of the archive.
        path: String,
        /// Read failure description.
        message: String,
    },

    /// A step's archive could not be fetched. Fatal here, unlike during
    /// catalog building.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A control statement (transaction or session management) failed.
    #[error("database error: {0}")]
    Database(#[from] DbError),

    /// A single dump statement failed, with enrichment for operators.
    #[error(
        "statement {stmt_index} for `{table}` failed: {message} (preview: {preview})"
    )]
    Sql {
        /// Table whose dump was executing.
        table: String,
        /// 0-based statement index within the step.
        stmt_index: usize,
        /// Whitespace-collapsed preview of the failing statement,
        /// at most 300 characters.
        preview: String,
        /// Driver error code, if present.
        code: Option<String>,
        /// Vendor error number, if present.
        errno: Option<u32>,
        /// SQLSTATE, if present.
        sql_state: Option<String>,
        /// Underlying driver message.
        message: String,
    },

    /// Execution was cancelled via its
    /// [`CancelFlag`](worldsync_catalog::CancelFlag).
    #[error("plan execution cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldsync_catalog::ApplyMode;

    #[test]
    fn unsupported_mode_parse_converts() {
        let err: ApplyError = "merge".parse::<ApplyMode>().unwrap_err().into();
        assert!(matches!(err, ApplyError::UnsupportedMode(_)));
        assert_eq!(err.to_string(), r#"unsupported apply mode: "merge""#);
    }

    #[test]
    fn sql_error_display_carries_context() {
        let err = ApplyError::Sql {
            table: "quest_rewards".into(),
            stmt_index: 3,
            preview: "INSERT INTO quest_rewards VALUES (1)".into(),
            code: Some("1062".into()),
            errno: Some(1062),
            sql_state: Some("23000".into()),
            message: "Duplicate entry".into(),
        };
        let text = err.to_string();
        assert!(text.contains("quest_rewards"));
        assert!(text.contains("statement 3"));
        assert!(text.contains("Duplicate entry"));
    }
}
