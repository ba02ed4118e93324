//! `worldsync plan` - preview which tables a selection would reload.

use crate::SelectionArgs;
use std::sync::Arc;
use worldsync_remote::{RemoteIndex, ReqwestClient};

pub(crate) async fn run(
    remote: Arc<RemoteIndex<ReqwestClient>>,
    reference: &str,
    selection: &SelectionArgs,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let plan = super::build_plan_for(remote, reference, selection).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&plan)?),
        _ => {
            for (index, step) in plan.steps.iter().enumerate() {
                println!("{:>3}. {:<40} {}", index + 1, step.table, step.display_label);
            }
            if !plan.excluded_dangerous.is_empty() {
                println!(
                    "excluded dangerous tables: {}",
                    plan.excluded_dangerous.join(", ")
                );
            }
            println!(
                "{} steps (mode: {}, truncate first: {})",
                plan.steps.len(),
                selection.mode,
                plan.options.truncate_first
            );
        }
    }
    Ok(())
}
