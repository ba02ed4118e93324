//! Transactional plan execution.
//!
//! Steps are applied in plan order inside one transaction spanning the
//! whole plan. Each step's SQL body is fetched just in time and dropped
//! before the next step starts, so peak memory is one archive plus one
//! decoded table regardless of plan size. The plan is all-or-nothing:
//! per-table commits would leave the database referentially torn during
//! the window foreign-key checks are disabled.

use crate::db::{DbError, SqlConnection};
use crate::error::{ApplyError, ApplyResult};
use crate::splitter::split_statements;
use std::io::{Cursor, Read};
use std::sync::Arc;
use tracing::{error, info, warn};
use worldsync_catalog::{ApplyMode, CancelFlag, Plan, PlanOptions, PlanStep, ProgressEvent, ProgressSink};
use worldsync_remote::RemoteSource;
use zip::ZipArchive;

/// Longest statement preview attached to enriched errors.
const PREVIEW_LIMIT: usize = 300;

/// Applies plans against a target database.
pub struct PlanExecutor<R: RemoteSource> {
    remote: Arc<R>,
    cancel: CancelFlag,
}

impl<R: RemoteSource> PlanExecutor<R> {
    /// Creates an executor fetching step bodies from the given remote.
    pub fn new(remote: Arc<R>) -> Self {
        Self {
            remote,
            cancel: CancelFlag::new(),
        }
    }

    /// Attaches a cancellation flag, checked between steps.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Applies the whole plan inside one transaction.
    ///
    /// On any failure the transaction is rolled back and the original
    /// error re-raised. Foreign-key enforcement is re-enabled as a
    /// final, unconditional step regardless of outcome.
    pub async fn apply_plan<C: SqlConnection>(
        &self,
        conn: &mut C,
        plan: &Plan,
        sink: &dyn ProgressSink,
    ) -> ApplyResult<()> {
        conn.execute("SET FOREIGN_KEY_CHECKS=0")
            .await
            .map_err(ApplyError::Database)?;

        let result = self.run_transaction(conn, plan, sink).await;

        if let Err(e) = conn.execute("SET FOREIGN_KEY_CHECKS=1").await {
            warn!(error = %e, "failed to re-enable foreign key checks");
        }
        result
    }

    async fn run_transaction<C: SqlConnection>(
        &self,
        conn: &mut C,
        plan: &Plan,
        sink: &dyn ProgressSink,
    ) -> ApplyResult<()> {
        conn.execute("START TRANSACTION")
            .await
            .map_err(ApplyError::Database)?;

        match self.run_steps(conn, plan, sink).await {
            Ok(()) => {
                conn.execute("COMMIT").await.map_err(ApplyError::Database)?;
                info!(steps = plan.steps.len(), "plan applied");
                Ok(())
            }
            Err(e) => {
                // Best effort; the original error is what the caller needs.
                if let Err(rollback) = conn.execute("ROLLBACK").await {
                    warn!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn run_steps<C: SqlConnection>(
        &self,
        conn: &mut C,
        plan: &Plan,
        sink: &dyn ProgressSink,
    ) -> ApplyResult<()> {
        let total = plan.steps.len();
        for (index, step) in plan.steps.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(ApplyError::Cancelled);
            }

            info!(table = %step.table, source = %step.display_label, "applying step");
            sink.emit(ProgressEvent::StepStarted {
                table: step.table.clone(),
                index,
                total,
            });

            // JIT fetch: this step's bytes and decoded text go out of
            // scope before the next step is touched.
            let bytes = self.remote.fetch_archive_bytes(&step.archive).await?;
            let text = decode_sql_entry(&bytes, step)?;
            drop(bytes);
            let text = transform(text, &step.table, &plan.options);

            let statements = split_statements(&text);
            for (stmt_index, statement) in statements.iter().enumerate() {
                if let Err(db) = conn.execute(statement).await {
                    let enriched = enrich(step, stmt_index, statement, db);
                    error!(
                        table = %step.table,
                        stmt_index,
                        error = %enriched,
                        "statement failed, rolling back plan"
                    );
                    sink.emit(ProgressEvent::Failed {
                        message: enriched.to_string(),
                    });
                    return Err(enriched);
                }
            }

            sink.emit(ProgressEvent::StepApplied {
                table: step.table.clone(),
                statements: statements.len(),
            });
        }
        Ok(())
    }
}

/// Decodes exactly one SQL entry from the archive bytes.
///
/// The recorded entry name is preferred; if it is gone, the first
/// SQL-suffixed entry stands in.
fn decode_sql_entry(bytes: &[u8], step: &PlanStep) -> ApplyResult<String> {
    let archive_err = |message: String| ApplyError::Archive {
        path: step.archive.path.clone(),
        message,
    };

    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| archive_err(e.to_string()))?;

    let name = if archive.file_names().any(|n| n == step.entry_name) {
        step.entry_name.clone()
    } else {
        archive
            .file_names()
            .find(|n| n.to_ascii_lowercase().ends_with(".sql"))
            .map(str::to_string)
            .ok_or_else(|| ApplyError::MissingEntry {
                table: step.table.clone(),
                archive: step.archive.path.clone(),
            })?
    };

    let mut entry = archive
        .by_name(&name)
        .map_err(|e| archive_err(e.to_string()))?;
    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|e| archive_err(e.to_string()))?;
    Ok(text)
}

/// Applies the requested mode and truncate options to a step's SQL.
fn transform(text: String, table: &str, options: &PlanOptions) -> String {
    let text = match options.mode {
        ApplyMode::Apply => text,
        ApplyMode::Replace => rewrite_insert_to_replace(&text),
    };
    if options.truncate_first {
        format!("TRUNCATE TABLE `{table}`;\n{text}")
    } else {
        text
    }
}

/// Rewrites every case-insensitive `INSERT INTO` to `REPLACE INTO`.
fn rewrite_insert_to_replace(sql: &str) -> String {
    const NEEDLE: &str = "INSERT INTO";
    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;
    while !rest.is_empty() {
        match rest.get(..NEEDLE.len()) {
            Some(head) if head.eq_ignore_ascii_case(NEEDLE) => {
                out.push_str("REPLACE INTO");
                rest = &rest[NEEDLE.len()..];
            }
            _ => {
                let mut chars = rest.chars();
                if let Some(ch) = chars.next() {
                    out.push(ch);
                }
                rest = chars.as_str();
            }
        }
    }
    out
}

/// Collapses whitespace and truncates to the preview limit.
fn preview(statement: &str) -> String {
    let collapsed = statement.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(PREVIEW_LIMIT).collect()
}

fn enrich(step: &PlanStep, stmt_index: usize, statement: &str, db: DbError) -> ApplyError {
    ApplyError::Sql {
        table: step.table.clone(),
        stmt_index,
        preview: preview(statement),
        code: db.code,
        errno: db.errno,
        sql_state: db.sql_state,
        message: db.message,
    }
}
