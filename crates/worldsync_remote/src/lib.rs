//! # WorldSync Remote
//!
//! Remote index resolution and archive fetching for WorldSync.
//!
//! This crate provides:
//! - Ref-to-commit resolution over the Git data API
//! - Recursive tree walking to discover table-dump archives
//! - Archive retrieval with a blob-API fallback path
//! - An HTTP client abstraction with a mock implementation
//!
//! ## Memory model
//!
//! Archive bytes are buffered fully in memory, but only for one archive
//! at a time. Nothing in this crate caches decoded content; callers
//! that need an archive twice fetch it twice.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod fetch;
mod http;
mod index;

pub use config::RemoteConfig;
pub use error::{RemoteError, RemoteResult};
pub use fetch::{ArchiveRef, MemoryRemote, RemoteSource};
pub use http::{HttpClient, HttpResponse, MockHttpClient, ReqwestClient};
pub use index::{ArchiveListing, ArchiveLocation, RemoteIndex, ResolvedCommit};
