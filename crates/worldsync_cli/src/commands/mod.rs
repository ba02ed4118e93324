//! Subcommand implementations.

pub mod apply;
pub mod catalog;
pub mod plan;

use crate::{Cli, SelectionArgs};
use std::sync::Arc;
use tracing::{debug, info, warn};
use worldsync_apply::ApplyError;
use worldsync_catalog::{
    build_plan, ApplyMode, Catalog, CatalogBuilder, DangerSet, Plan, PlanOptions, ProgressEvent,
    ProgressSink, Selection,
};
use worldsync_remote::{RemoteConfig, RemoteIndex, ReqwestClient};

/// Builds the remote index from global CLI options.
pub(crate) fn remote(cli: &Cli) -> Arc<RemoteIndex<ReqwestClient>> {
    let token = cli
        .token
        .clone()
        .or_else(|| std::env::var("WORLDSYNC_TOKEN").ok());

    let mut config = RemoteConfig::new(&cli.owner, &cli.repo)
        .with_archive_root(cli.archive_root.clone());
    if let Some(token) = &token {
        config = config.with_token(token.clone());
    }

    Arc::new(RemoteIndex::new(config, ReqwestClient::new(token)))
}

/// Mirrors pipeline progress events into the log stream.
pub(crate) struct LogSink;

impl ProgressSink for LogSink {
    fn emit(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::RefResolved { commit_id } => info!(%commit_id, "ref resolved"),
            ProgressEvent::ArchivesFound { count } => info!(count, "archives found"),
            ProgressEvent::ArchiveFailed { path, message } => {
                warn!(%path, %message, "archive skipped");
            }
            ProgressEvent::ArchiveEmpty { path } => warn!(%path, "archive holds no SQL entries"),
            ProgressEvent::StepStarted { table, index, total } => {
                info!(%table, step = index + 1, total, "applying");
            }
            ProgressEvent::Done { tables, commit_id } => info!(tables, %commit_id, "done"),
            ProgressEvent::Failed { message } => warn!(%message, "failed"),
            other => debug!(event = ?other, "progress"),
        }
    }
}

/// Builds the catalog for a ref, with progress mirrored to the log.
pub(crate) async fn build_catalog(
    remote: Arc<RemoteIndex<ReqwestClient>>,
    reference: &str,
) -> Result<Catalog, Box<dyn std::error::Error>> {
    let builder = CatalogBuilder::new(remote);
    Ok(builder.build_with_progress(reference, &LogSink).await?)
}

/// Resolves selection arguments into a plan over a fresh catalog.
pub(crate) async fn build_plan_for(
    remote: Arc<RemoteIndex<ReqwestClient>>,
    reference: &str,
    args: &SelectionArgs,
) -> Result<Plan, Box<dyn std::error::Error>> {
    let mode: ApplyMode = args.mode.parse().map_err(ApplyError::from)?;
    let options = PlanOptions {
        include_dangerous: args.include_dangerous,
        mode,
        truncate_first: args.truncate_first,
    };
    let selection = Selection::tables(args.tables.clone()).and_groups(args.groups.clone());

    let catalog = build_catalog(remote, reference).await?;
    let plan = build_plan(&catalog, &selection, &DangerSet::builtin(), options);

    for table in &plan.excluded_dangerous {
        warn!(%table, "excluded dangerous table (use --include-dangerous to override)");
    }
    Ok(plan)
}
