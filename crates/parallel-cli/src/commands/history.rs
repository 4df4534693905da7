//! History commands: the merged transaction view.

use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;

use parallel_history::{group_by_day, HistoryFilter};

use crate::context;
use crate::output;
use crate::GlobalOpts;

const HEADERS: [&str; 5] = ["HASH", "TITLE", "AMOUNT", "STATUS", "TIME"];

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List transactions, newest first.
    List {
        /// Filter: all|sent|received|contract|rbtc|lut.
        #[arg(long, default_value = "all")]
        filter: String,
    },
}

pub async fn run(action: HistoryAction, opts: &GlobalOpts) -> std::result::Result<(), String> {
    match action {
        HistoryAction::List { filter } => list(opts, &filter).await,
    }
}

async fn list(opts: &GlobalOpts, filter: &str) -> std::result::Result<(), String> {
    let filter = filter
        .parse::<HistoryFilter>()
        .map_err(|e| e.to_string())?;

    let app = context::open_app(opts)?;
    let records = app.load_history(filter).await.map_err(|e| e.to_string())?;

    if opts.json {
        output::print_value(&records, true);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", "(no transactions)".dimmed());
        return Ok(());
    }

    for (label, bucket) in group_by_day(records, Utc::now()) {
        println!("{}", label.bold());
        let rows: Vec<Vec<String>> = bucket
            .iter()
            .map(|record| {
                vec![
                    output::truncate_id(&record.hash.to_string()),
                    record.title.clone(),
                    record.amount.clone(),
                    record.status.to_string(),
                    output::fmt_time(record.timestamp_ms),
                ]
            })
            .collect();
        output::print_table(&HEADERS, &rows, false);
        println!();
    }

    Ok(())
}
