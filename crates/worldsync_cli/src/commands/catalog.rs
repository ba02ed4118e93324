//! `worldsync catalog` - discover and list reloadable tables.

use std::sync::Arc;
use worldsync_remote::{RemoteIndex, ReqwestClient};

pub(crate) async fn run(
    remote: Arc<RemoteIndex<ReqwestClient>>,
    reference: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = super::build_catalog(remote, reference).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&catalog)?),
        _ => {
            println!("commit {}", catalog.commit_id);
            println!("{:<40} {:<22} source", "table", "group");
            for row in &catalog.rows {
                println!("{:<40} {:<22} {}", row.table, row.group, row.display_label);
            }
            println!("{} tables", catalog.rows.len());
        }
    }
    Ok(())
}
