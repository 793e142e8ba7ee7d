//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use chrono::{DateTime, Utc};
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::ledger::LedgerEntry;
use crate::vault::record::RecordMetadata;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Format an epoch-milliseconds timestamp for display.
fn format_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map_or_else(|| millis.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Print a table of record metadata (Id, Kind, Created).
pub fn print_records_table(records: &[RecordMetadata]) {
    if records.is_empty() {
        info("No records in this vault yet.");
        tip("Run `havenvault put journal '{\"body\":\"...\"}'` to add your first record.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Kind", "Created"]);

    for r in records {
        table.add_row(vec![
            r.id.clone(),
            r.kind.to_string(),
            format_millis(r.created_at),
        ]);
    }

    println!("{table}");
}

/// Print a table of ledger entries (Seq, Kind, Record, Created, Entry hash).
pub fn print_ledger_table(entries: &[LedgerEntry]) {
    if entries.is_empty() {
        info("The ledger is empty.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Seq", "Kind", "Record", "Created", "Entry hash"]);

    for e in entries {
        // The full base64 hash is noise in a terminal; a prefix is
        // plenty for eyeballing.
        let hash_prefix: String = e.entry_hash.chars().take(12).collect();
        table.add_row(vec![
            e.seq.to_string(),
            e.kind.to_string(),
            e.record_id.clone(),
            format_millis(e.created_at),
            format!("{hash_prefix}…"),
        ]);
    }

    println!("{table}");
}
