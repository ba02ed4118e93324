//! # WorldSync Apply
//!
//! SQL statement splitting and transactional plan execution.
//!
//! This crate provides:
//! - A lexer that splits dump text into executable statements, treating
//!   quoted strings and comments as opaque to the `;` terminator
//! - A database connection abstraction with a MySQL implementation
//! - The plan executor: just-in-time fetching, statement rewriting and
//!   all-or-nothing application inside one transaction
//!
//! ## Key invariants
//!
//! - At most one step's decoded SQL text is in memory at a time
//! - The whole plan runs in a single transaction; any failure rolls
//!   everything back
//! - Foreign-key enforcement is restored no matter how execution ends

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod db;
mod error;
mod executor;
mod splitter;

pub use db::{DbError, MySqlTarget, RecordingConnection, SqlConnection};
pub use error::{ApplyError, ApplyResult};
pub use executor::PlanExecutor;
pub use splitter::split_statements;
