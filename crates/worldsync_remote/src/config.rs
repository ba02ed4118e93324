//! Configuration for the remote archive source.

/// Configuration for a remote repository holding table-dump archives.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Base URL of the Git data API.
    pub api_base: String,
    /// Base URL for raw file downloads.
    pub raw_base: String,
    /// Optional bearer credential; raises API rate limits.
    pub token: Option<String>,
    /// Path prefix under which table-dump archives live.
    pub archive_root: String,
    /// Archive file extension, matched case-insensitively.
    pub archive_ext: String,
}

impl RemoteConfig {
    /// Creates a configuration for the given repository.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            api_base: "https://api.github.com".into(),
            raw_base: "https://raw.githubusercontent.com".into(),
            token: None,
            archive_root: "database/tables/".into(),
            archive_ext: ".zip".into(),
        }
    }

    /// Sets the bearer credential used on API requests.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the archive root prefix.
    pub fn with_archive_root(mut self, root: impl Into<String>) -> Self {
        self.archive_root = root.into();
        self
    }

    /// Sets the API base URL (useful for self-hosted forges and tests).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Sets the raw download base URL.
    pub fn with_raw_base(mut self, base: impl Into<String>) -> Self {
        self.raw_base = base.into();
        self
    }

    /// URL that resolves a ref to a commit.
    pub(crate) fn commit_url(&self, reference: &str) -> String {
        format!(
            "{}/repos/{}/{}/commits/{}",
            self.api_base, self.owner, self.repo, reference
        )
    }

    /// URL that lists a tree recursively.
    pub(crate) fn tree_url(&self, tree_id: &str) -> String {
        format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.api_base, self.owner, self.repo, tree_id
        )
    }

    /// URL that fetches a blob's content by id.
    pub(crate) fn blob_url(&self, blob_id: &str) -> String {
        format!(
            "{}/repos/{}/{}/git/blobs/{}",
            self.api_base, self.owner, self.repo, blob_id
        )
    }

    /// Direct-download URL for a path at a commit.
    pub(crate) fn raw_url(&self, commit_id: &str, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.raw_base, self.owner, self.repo, commit_id, path
        )
    }
}
