//! Archive retrieval with a blob-API fallback path.

use crate::error::{RemoteError, RemoteResult};
use crate::http::HttpClient;
use crate::index::{ArchiveListing, ArchiveLocation, BlobResponse, RemoteIndex, ResolvedCommit};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Enough information to re-fetch an archive later without re-walking
/// the remote tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRef {
    /// Full path within the repository.
    pub path: String,
    /// Content-addressed blob id, used by the fallback path.
    pub blob_id: String,
    /// Direct-download URL, used by the primary path.
    pub raw_url: String,
    /// The resolved commit this archive belongs to.
    pub commit_id: String,
}

impl ArchiveRef {
    /// Builds a ref from a listed archive location and its commit.
    pub fn from_location(location: &ArchiveLocation, commit_id: &str) -> Self {
        Self {
            path: location.path.clone(),
            blob_id: location.blob_id.clone(),
            raw_url: location.raw_url.clone(),
            commit_id: commit_id.to_string(),
        }
    }
}

/// The remote source of truth, as seen by catalog building and plan
/// execution.
///
/// Abstracting this behind a trait keeps the pipeline testable without
/// network access.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Resolves a ref to its commit and root tree ids.
    async fn resolve_commit(&self, reference: &str) -> RemoteResult<ResolvedCommit>;

    /// Lists all archives under the archive root at the given ref.
    async fn list_archives(&self, reference: &str) -> RemoteResult<ArchiveListing>;

    /// Retrieves one archive's bytes.
    async fn fetch_archive_bytes(&self, archive: &ArchiveRef) -> RemoteResult<Vec<u8>>;
}

#[async_trait]
impl<C: HttpClient> RemoteSource for RemoteIndex<C> {
    async fn resolve_commit(&self, reference: &str) -> RemoteResult<ResolvedCommit> {
        RemoteIndex::resolve_commit(self, reference).await
    }

    async fn list_archives(&self, reference: &str) -> RemoteResult<ArchiveListing> {
        RemoteIndex::list_archives(self, reference).await
    }

    /// Tries the direct download first; on any failure falls back to a
    /// content-addressed blob lookup and decodes its base64 payload.
    async fn fetch_archive_bytes(&self, archive: &ArchiveRef) -> RemoteResult<Vec<u8>> {
        let direct_failure = match self.client().get(&archive.raw_url).await {
            Ok(response) if response.is_success() => return Ok(response.body),
            Ok(response) => format!("direct download returned status {}", response.status),
            Err(e) => format!("direct download failed: {e}"),
        };
        warn!(path = %archive.path, %direct_failure, "falling back to blob fetch");

        let url = self.config().blob_url(&archive.blob_id);
        let blob: BlobResponse = self.get_json(&url).await.map_err(|e| {
            RemoteError::fetch(&archive.path, format!("{direct_failure}; blob fetch: {e}"))
        })?;

        if blob.encoding != "base64" {
            return Err(RemoteError::Encoding {
                path: archive.path.clone(),
                encoding: blob.encoding,
            });
        }

        // The blob API wraps base64 content in newlines.
        let compact: String = blob.content.chars().filter(|c| !c.is_whitespace()).collect();
        BASE64.decode(compact.as_bytes()).map_err(|e| {
            RemoteError::fetch(&archive.path, format!("invalid base64 payload: {e}"))
        })
    }
}

/// An in-memory remote source for testing.
///
/// Archives are registered as path/bytes pairs; fetches are recorded in
/// order so callers can assert sequencing.
#[derive(Default)]
pub struct MemoryRemote {
    commit_id: String,
    archives: RwLock<Vec<ArchiveLocation>>,
    bytes: RwLock<HashMap<String, Vec<u8>>>,
    failing: RwLock<HashSet<String>>,
    fetch_log: RwLock<Vec<String>>,
}

impl MemoryRemote {
    /// Creates a remote that resolves every ref to the given commit.
    pub fn new(commit_id: impl Into<String>) -> Self {
        Self {
            commit_id: commit_id.into(),
            ..Self::default()
        }
    }

    /// Registers an archive at a path with the given bytes.
    pub fn add_archive(&self, path: impl Into<String>, bytes: Vec<u8>) {
        let path = path.into();
        let basename = path.rsplit('/').next().unwrap_or(&path).to_string();
        self.archives.write().push(ArchiveLocation {
            blob_id: format!("blob-{path}"),
            raw_url: format!("memory://{path}"),
            basename,
            path: path.clone(),
        });
        self.bytes.write().insert(path, bytes);
    }

    /// Makes fetches for a path fail.
    pub fn fail_archive(&self, path: impl Into<String>) {
        self.failing.write().insert(path.into());
    }

    /// Returns the archive paths fetched so far, in order.
    pub fn fetch_log(&self) -> Vec<String> {
        self.fetch_log.read().clone()
    }
}

#[async_trait]
impl RemoteSource for MemoryRemote {
    async fn resolve_commit(&self, _reference: &str) -> RemoteResult<ResolvedCommit> {
        Ok(ResolvedCommit {
            commit_id: self.commit_id.clone(),
            tree_id: format!("tree-{}", self.commit_id),
        })
    }

    async fn list_archives(&self, _reference: &str) -> RemoteResult<ArchiveListing> {
        Ok(ArchiveListing {
            commit_id: self.commit_id.clone(),
            archives: self.archives.read().clone(),
        })
    }

    async fn fetch_archive_bytes(&self, archive: &ArchiveRef) -> RemoteResult<Vec<u8>> {
        self.fetch_log.write().push(archive.path.clone());
        if self.failing.read().contains(&archive.path) {
            return Err(RemoteError::fetch(&archive.path, "injected failure"));
        }
        self.bytes
            .read()
            .get(&archive.path)
            .cloned()
            .ok_or_else(|| RemoteError::fetch(&archive.path, "no such archive"))
    }
}
