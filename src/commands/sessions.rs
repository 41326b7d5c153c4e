//! Session listing command
//!
//! Fetches session summaries from the server and prints them as a table.

use prettytable::{row, Table};

use crate::error::Result;
use crate::remote::RemoteSessionClient;

/// Lists sessions stored on the server
///
/// # Errors
///
/// Propagates remote and authentication failures.
pub async fn run_sessions(client: &impl RemoteSessionClient) -> Result<()> {
    let summaries = client.list_sessions().await?;

    if summaries.is_empty() {
        println!("No sessions yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.add_row(row!["ID", "TITLE", "CREATED"]);
    for summary in summaries {
        table.add_row(row![summary.id, summary.title, summary.created_at]);
    }
    table.printstd();

    Ok(())
}
