//! Metadata-only catalog building.
//!
//! For every archive the builder opens the ZIP container, lists the SQL
//! entry names inside without decoding their contents, derives a
//! logical table name per entry and produces one sorted catalog row per
//! table. Archives are processed strictly sequentially: the memory high
//! water mark is one archive's compressed bytes, and hammering the
//! remote with parallel downloads is avoided.

use crate::cancel::CancelFlag;
use crate::error::{CatalogError, CatalogResult};
use crate::groups::assign_group;
use crate::progress::{NullSink, ProgressEvent, ProgressSink};
use serde::Serialize;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{info, warn};
use worldsync_remote::{ArchiveRef, RemoteSource};
use zip::ZipArchive;

/// Fallback table name when neither the entry nor the archive yields one.
const UNKNOWN_TABLE: &str = "unknown_table";

/// One row per discovered table-dump entry. Metadata only; rows never
/// carry decoded SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRow {
    /// Logical table name.
    pub table: String,
    /// Logical group assigned by prefix matching.
    pub group: String,
    /// Human-readable "archive :: entry" label for previews.
    pub display_label: String,
    /// Unique identity for the row: `archivePath::entryName`.
    pub source_locator: String,
    /// Enough information to re-fetch the archive later.
    pub archive: ArchiveRef,
    /// Exact name of the SQL entry inside the archive.
    pub entry_name: String,
}

/// An immutable catalog: rows sorted by table name, all sharing one
/// resolved commit id.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    /// The commit every row was discovered at.
    pub commit_id: String,
    /// Catalog rows, sorted by table name ascending.
    pub rows: Vec<CatalogRow>,
}

/// Lists the SQL entry names inside an archive, in encounter order.
///
/// Entry contents are never decoded.
pub fn list_entry_names(bytes: &[u8]) -> CatalogResult<Vec<String>> {
    let archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| CatalogError::Archive(e.to_string()))?;
    Ok(archive
        .file_names()
        .filter(|name| name.to_ascii_lowercase().ends_with(".sql"))
        .map(str::to_string)
        .collect())
}

/// Derives the logical table name for an entry.
///
/// The entry's basename minus the `.sql` extension wins; failing that,
/// the archive's basename minus its extension; failing that, a literal
/// `unknown_table` sentinel.
pub fn derive_table_name(entry_name: &str, archive_basename: &str) -> String {
    let entry_base = entry_name.rsplit('/').next().unwrap_or(entry_name);
    let lowered = entry_base.to_ascii_lowercase();
    if lowered.ends_with(".sql") && entry_base.len() > 4 {
        return entry_base[..entry_base.len() - 4].to_string();
    }

    let stripped = match archive_basename.rfind('.') {
        Some(dot) => &archive_basename[..dot],
        None => archive_basename,
    };
    if stripped.is_empty() {
        UNKNOWN_TABLE.to_string()
    } else {
        stripped.to_string()
    }
}

/// Builds catalogs against a remote source.
pub struct CatalogBuilder<R: RemoteSource> {
    remote: Arc<R>,
    cancel: CancelFlag,
}

impl<R: RemoteSource> CatalogBuilder<R> {
    /// Creates a builder over the given remote.
    pub fn new(remote: Arc<R>) -> Self {
        Self {
            remote,
            cancel: CancelFlag::new(),
        }
    }

    /// Attaches a cancellation flag, checked between archives.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Builds a catalog for the given ref.
    pub async fn build(&self, reference: &str) -> CatalogResult<Catalog> {
        self.build_with_progress(reference, &NullSink).await
    }

    /// Builds a catalog, emitting progress events along the way.
    ///
    /// Emits a terminal [`ProgressEvent::Done`] on success or
    /// [`ProgressEvent::Failed`] on a fatal error. Per-archive failures
    /// are not fatal; the archive is skipped with a warning.
    pub async fn build_with_progress(
        &self,
        reference: &str,
        sink: &dyn ProgressSink,
    ) -> CatalogResult<Catalog> {
        match self.build_inner(reference, sink).await {
            Ok(catalog) => {
                sink.emit(ProgressEvent::Done {
                    tables: catalog.rows.len(),
                    commit_id: catalog.commit_id.clone(),
                });
                Ok(catalog)
            }
            Err(e) => {
                sink.emit(ProgressEvent::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn build_inner(
        &self,
        reference: &str,
        sink: &dyn ProgressSink,
    ) -> CatalogResult<Catalog> {
        let listing = self.remote.list_archives(reference).await?;
        sink.emit(ProgressEvent::RefResolved {
            commit_id: listing.commit_id.clone(),
        });
        sink.emit(ProgressEvent::ArchivesFound {
            count: listing.archives.len(),
        });
        info!(
            reference,
            commit = %listing.commit_id,
            archives = listing.archives.len(),
            "building catalog"
        );

        let total = listing.archives.len();
        let mut rows = Vec::new();

        // Strictly sequential by design: bounds memory to one archive
        // and keeps the remote's rate limiter happy.
        for (index, location) in listing.archives.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(CatalogError::Cancelled);
            }

            sink.emit(ProgressEvent::ArchiveStarted {
                path: location.path.clone(),
                index,
                total,
            });

            let archive = ArchiveRef::from_location(location, &listing.commit_id);
            let entries = match self.read_entries(&archive).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %location.path, error = %e, "skipping unreadable archive");
                    sink.emit(ProgressEvent::ArchiveFailed {
                        path: location.path.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if entries.is_empty() {
                warn!(path = %location.path, "archive holds no SQL entries, skipping");
                sink.emit(ProgressEvent::ArchiveEmpty {
                    path: location.path.clone(),
                });
                continue;
            }

            let before = rows.len();
            for entry_name in entries {
                let table = derive_table_name(&entry_name, &location.basename);
                rows.push(CatalogRow {
                    group: assign_group(&table).to_string(),
                    display_label: format!("{} :: {}", location.basename, entry_name),
                    source_locator: format!("{}::{}", location.path, entry_name),
                    archive: archive.clone(),
                    entry_name,
                    table,
                });
            }
            sink.emit(ProgressEvent::ArchiveCataloged {
                path: location.path.clone(),
                tables: rows.len() - before,
            });
        }

        rows.sort_by(|a, b| a.table.cmp(&b.table));
        info!(tables = rows.len(), "catalog built");
        Ok(Catalog {
            commit_id: listing.commit_id,
            rows,
        })
    }

    /// Fetches one archive and lists its SQL entries. The bytes go out
    /// of scope before the next archive is touched.
    async fn read_entries(&self, archive: &ArchiveRef) -> CatalogResult<Vec<String>> {
        let bytes = self.remote.fetch_archive_bytes(archive).await?;
        list_entry_names(&bytes)
    }
}
