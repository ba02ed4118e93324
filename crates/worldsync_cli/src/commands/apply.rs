//! `worldsync apply` - apply a plan to the target database.

use crate::SelectionArgs;
use std::sync::Arc;
use tracing::info;
use worldsync_apply::{MySqlTarget, PlanExecutor};
use worldsync_remote::{RemoteIndex, ReqwestClient};

pub(crate) async fn run(
    remote: Arc<RemoteIndex<ReqwestClient>>,
    reference: &str,
    selection: &SelectionArgs,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let plan = super::build_plan_for(Arc::clone(&remote), reference, selection).await?;
    if plan.is_empty() {
        return Err("plan is empty: nothing selected, or everything was filtered out".into());
    }
    info!(steps = plan.steps.len(), "applying plan");

    let mut conn = MySqlTarget::connect(database_url).await?;
    let executor = PlanExecutor::new(remote);
    let result = executor.apply_plan(&mut conn, &plan, &super::LogSink).await;
    conn.close().await?;
    result?;

    info!("all steps applied and committed");
    Ok(())
}
