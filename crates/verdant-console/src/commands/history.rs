//! History browsing command.

use anyhow::{Context, Result};

use verdant_client::HistoryClient;
use verdant_types::{HistoryRecord, TypeFilter};

use crate::cli::OutputFormat;
use crate::format;
use crate::pager::Pager;

/// Fetch the full history set, filter and paginate client-side, and print
/// one page.
pub async fn cmd_history(
    client: &HistoryClient,
    filter: TypeFilter,
    page: usize,
    fmt: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let records = client
        .all_records()
        .await
        .context("Failed to fetch history")?;

    let filtered: Vec<HistoryRecord> = records
        .into_iter()
        .filter(|r| r.matches(filter))
        .collect();

    let mut pager = Pager::default();
    pager.set_total_items(filtered.len());
    pager.goto(page);
    let page_records = pager.page_of(&filtered);

    match fmt {
        OutputFormat::Json => println!("{}", format::history_json(page_records)?),
        OutputFormat::Text => {
            if !quiet {
                eprintln!(
                    "Page {}/{} [{}] - {} record(s) total",
                    pager.current_page(),
                    pager.total_pages(),
                    filter.label(),
                    filtered.len()
                );
            }
            println!("{}", format::history_table(page_records));
        }
    }
    Ok(())
}
