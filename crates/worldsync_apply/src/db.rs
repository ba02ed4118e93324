//! Database connection abstraction.
//!
//! The executor talks to the target database through [`SqlConnection`]
//! so it can be tested against a recording double. The production
//! implementation wraps a raw sqlx MySQL connection; taking `&mut self`
//! means the borrow checker serializes plan executions per connection.

use async_trait::async_trait;
use sqlx::mysql::MySqlDatabaseError;
use sqlx::Connection as _;
use thiserror::Error;

/// A structured database error, preserving the driver's code, vendor
/// number and SQLSTATE when present.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DbError {
    /// Human-readable driver message.
    pub message: String,
    /// Driver error code (stringified vendor number for MySQL).
    pub code: Option<String>,
    /// Vendor error number.
    pub errno: Option<u32>,
    /// SQLSTATE.
    pub sql_state: Option<String>,
}

impl DbError {
    /// Creates an error carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            errno: None,
            sql_state: None,
        }
    }

    fn from_sqlx(err: sqlx::Error) -> Self {
        match err.as_database_error() {
            Some(db) => {
                let errno = db
                    .try_downcast_ref::<MySqlDatabaseError>()
                    .map(|mysql| u32::from(mysql.number()));
                Self {
                    message: db.message().to_string(),
                    code: errno.map(|n| n.to_string()),
                    errno,
                    sql_state: db.code().map(|c| c.into_owned()),
                }
            }
            None => Self::message(err.to_string()),
        }
    }
}

/// A database connection capable of running commands.
///
/// Transactions are driven through plain `execute` calls
/// (`START TRANSACTION` / `COMMIT` / `ROLLBACK`), matching how dump
/// statements themselves are run.
#[async_trait]
pub trait SqlConnection: Send {
    /// Executes one SQL command.
    async fn execute(&mut self, sql: &str) -> Result<(), DbError>;
}

/// Production target: a single MySQL connection.
pub struct MySqlTarget {
    inner: sqlx::MySqlConnection,
}

impl MySqlTarget {
    /// Connects to the given database URL.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let inner = sqlx::MySqlConnection::connect(url)
            .await
            .map_err(DbError::from_sqlx)?;
        Ok(Self { inner })
    }

    /// Closes the connection cleanly.
    pub async fn close(self) -> Result<(), DbError> {
        self.inner.close().await.map_err(DbError::from_sqlx)
    }
}

#[async_trait]
impl SqlConnection for MySqlTarget {
    async fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        sqlx::query(sql)
            .execute(&mut self.inner)
            .await
            .map(|_| ())
            .map_err(DbError::from_sqlx)
    }
}

/// A connection double that records every executed command, for tests.
///
/// Can be armed to fail the first statement containing a given
/// substring, to exercise rollback paths.
#[derive(Default)]
pub struct RecordingConnection {
    executed: Vec<String>,
    fail_on: Option<(String, DbError)>,
}

impl RecordingConnection {
    /// Creates a connection that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the connection to fail statements containing `needle`.
    pub fn fail_when_contains(mut self, needle: impl Into<String>, error: DbError) -> Self {
        self.fail_on = Some((needle.into(), error));
        self
    }

    /// Every command executed so far, in order.
    pub fn executed(&self) -> &[String] {
        &self.executed
    }
}

#[async_trait]
impl SqlConnection for RecordingConnection {
    async fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        self.executed.push(sql.to_string());
        if let Some((needle, error)) = &self.fail_on {
            if sql.contains(needle.as_str()) {
                return Err(error.clone());
            }
        }
        Ok(())
    }
}
