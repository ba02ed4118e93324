//! # WorldSync Catalog
//!
//! Catalog and plan building for WorldSync.
//!
//! This crate provides:
//! - Metadata-only catalog building over remote table-dump archives
//! - Logical grouping of tables by name prefix
//! - The danger classifier protecting sensitive player/account tables
//! - Deterministic plan building from a catalog and a selection
//! - Progress event emission and an injectable catalog store
//!
//! ## Key invariants
//!
//! - Catalog rows never carry decoded SQL text
//! - Archives are fetched sequentially, never concurrently (memory bound)
//! - All rows of one catalog share one resolved commit id
//! - Plan building never fails; an empty selection yields an empty plan
//! - Progress sinks can never throw back into the pipeline

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod cancel;
mod danger;
mod error;
mod groups;
mod plan;
mod progress;
mod store;

pub use builder::{derive_table_name, list_entry_names, Catalog, CatalogBuilder, CatalogRow};
pub use cancel::CancelFlag;
pub use danger::DangerSet;
pub use error::{CatalogError, CatalogResult};
pub use groups::{assign_group, known_groups, GROUP_OTHER};
pub use plan::{build_plan, ApplyMode, Plan, PlanOptions, PlanStep, Selection, UnsupportedModeError};
pub use progress::{ChannelSink, MemorySink, NullSink, ProgressEvent, ProgressSink};
pub use store::{CatalogStore, MemoryCatalogStore};
