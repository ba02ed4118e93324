//! Remote index resolution over the Git data API.
//!
//! Turns a ref (branch, tag, commit) into a commit SHA and a flat list
//! of archive locations under the configured archive root. These are
//! pure reads; nothing is cached here.

use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::http::HttpClient;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// A ref resolved to its commit and root tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommit {
    /// The commit SHA the ref points at.
    pub commit_id: String,
    /// The commit's root tree SHA.
    pub tree_id: String,
}

/// One discovered archive in the remote tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLocation {
    /// Full path within the repository.
    pub path: String,
    /// File basename (last path component).
    pub basename: String,
    /// Content-addressed blob id.
    pub blob_id: String,
    /// Direct-download URL at the resolved commit.
    pub raw_url: String,
}

/// The archives found under the archive root at one commit.
#[derive(Debug, Clone)]
pub struct ArchiveListing {
    /// The resolved commit all paths belong to.
    pub commit_id: String,
    /// Discovered archives, in tree encounter order.
    pub archives: Vec<ArchiveLocation>,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    tree: Option<TreeRef>,
}

#[derive(Deserialize)]
struct TreeRef {
    sha: Option<String>,
}

#[derive(Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
}

#[derive(Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
}

#[derive(Deserialize)]
pub(crate) struct BlobResponse {
    pub(crate) content: String,
    pub(crate) encoding: String,
}

/// Resolves refs and walks the remote tree listing.
pub struct RemoteIndex<C: HttpClient> {
    config: RemoteConfig,
    client: C,
}

impl<C: HttpClient> RemoteIndex<C> {
    /// Creates an index over the given repository and HTTP client.
    pub fn new(config: RemoteConfig, client: C) -> Self {
        Self { config, client }
    }

    /// Returns the repository configuration.
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> RemoteResult<T> {
        let response = self.client.get(url).await?;
        if !response.is_success() {
            return Err(RemoteError::lookup(format!(
                "{} returned status {}",
                url, response.status
            )));
        }
        serde_json::from_slice(&response.body)
            .map_err(|e| RemoteError::malformed(url, e.to_string()))
    }

    /// Resolves a ref to its commit and root tree ids.
    pub async fn resolve_commit(&self, reference: &str) -> RemoteResult<ResolvedCommit> {
        let url = self.config.commit_url(reference);
        let response: CommitResponse = self.get_json(&url).await?;

        let tree_id = response
            .commit
            .tree
            .and_then(|t| t.sha)
            .ok_or_else(|| RemoteError::lookup(format!("ref {reference:?} has no tree id")))?;

        debug!(reference, commit = %response.sha, "resolved ref");
        Ok(ResolvedCommit {
            commit_id: response.sha,
            tree_id,
        })
    }

    /// Lists all archives under the archive root at the given ref.
    pub async fn list_archives(&self, reference: &str) -> RemoteResult<ArchiveListing> {
        let resolved = self.resolve_commit(reference).await?;
        let url = self.config.tree_url(&resolved.tree_id);
        let response: TreeResponse = self.get_json(&url).await?;

        let ext = self.config.archive_ext.to_ascii_lowercase();
        let archives = response
            .tree
            .into_iter()
            .filter(|entry| {
                entry.kind == "blob"
                    && entry.path.starts_with(&self.config.archive_root)
                    && entry.path.to_ascii_lowercase().ends_with(&ext)
            })
            .map(|entry| {
                let basename = entry
                    .path
                    .rsplit('/')
                    .next()
                    .unwrap_or(entry.path.as_str())
                    .to_string();
                let raw_url = self.config.raw_url(&resolved.commit_id, &entry.path);
                ArchiveLocation {
                    path: entry.path,
                    basename,
                    blob_id: entry.sha,
                    raw_url,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            commit = %resolved.commit_id,
            count = archives.len(),
            "listed archives"
        );
        Ok(ArchiveListing {
            commit_id: resolved.commit_id,
            archives,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpClient;

    fn test_index(client: MockHttpClient) -> RemoteIndex<MockHttpClient> {
        RemoteIndex::new(RemoteConfig::new("o", "r"), client)
    }

    fn commit_body(sha: &str, tree: &str) -> String {
        format!(r#"{{"sha":"{sha}","commit":{{"tree":{{"sha":"{tree}"}}}}}}"#)
    }

    #[tokio::test]
    async fn resolve_commit_ok() {
        let client = MockHttpClient::new();
        client.respond(
            "https://api.github.com/repos/o/r/commits/main",
            commit_body("c1", "t1"),
        );

        let index = test_index(client);
        let resolved = index.resolve_commit("main").await.unwrap();
        assert_eq!(resolved.commit_id, "c1");
        assert_eq!(resolved.tree_id, "t1");
    }

    #[tokio::test]
    async fn resolve_commit_bad_ref() {
        let client = MockHttpClient::new();
        client.respond_with_status(
            "https://api.github.com/repos/o/r/commits/nope",
            404,
            b"{}".to_vec(),
        );

        let index = test_index(client);
        let err = index.resolve_commit("nope").await.unwrap_err();
        assert!(matches!(err, RemoteError::Lookup { .. }));
    }

    #[tokio::test]
    async fn resolve_commit_missing_tree_id() {
        let client = MockHttpClient::new();
        client.respond(
            "https://api.github.com/repos/o/r/commits/main",
            r#"{"sha":"c1","commit":{"tree":{}}}"#,
        );

        let index = test_index(client);
        let err = index.resolve_commit("main").await.unwrap_err();
        assert!(matches!(err, RemoteError::Lookup { .. }));
        assert!(err.to_string().contains("tree id"));
    }

    #[tokio::test]
    async fn list_archives_filters_root_and_extension() {
        let client = MockHttpClient::new();
        client.respond(
            "https://api.github.com/repos/o/r/commits/main",
            commit_body("c1", "t1"),
        );
        client.respond(
            "https://api.github.com/repos/o/r/git/trees/t1?recursive=1",
            r#"{"tree":[
                {"path":"database/tables/items.zip","type":"blob","sha":"b1"},
                {"path":"database/tables/quests.ZIP","type":"blob","sha":"b2"},
                {"path":"database/tables/readme.md","type":"blob","sha":"b3"},
                {"path":"scripts/zones.zip","type":"blob","sha":"b4"},
                {"path":"database/tables/sub","type":"tree","sha":"b5"}
            ]}"#,
        );

        let index = test_index(client);
        let listing = index.list_archives("main").await.unwrap();

        assert_eq!(listing.commit_id, "c1");
        let paths: Vec<&str> = listing.archives.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["database/tables/items.zip", "database/tables/quests.ZIP"]
        );
        assert_eq!(listing.archives[0].basename, "items.zip");
        assert_eq!(
            listing.archives[0].raw_url,
            "https://raw.githubusercontent.com/o/r/c1/database/tables/items.zip"
        );
    }
}
