//! Final run summary output: a status table or JSON.

use anyhow::Result;
use batchdl_core::finished::FinishedState;
use batchdl_core::workflow::RunSummary;
use std::fmt::Write as _;

pub fn print_summary(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        print!("{}", format_table(summary));
    }
    Ok(())
}

pub fn format_table(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<6} {:<20} {}", "ITEM", "STATE", "URL");
    for row in &summary.items {
        let _ = writeln!(out, "{:<6} {:<20} {}", row.index + 1, row.state.as_str(), row.url);
        if let Some(title) = &row.title {
            let _ = writeln!(out, "{:<6} {:<20} {}", "", "", title);
        }
    }
    let _ = writeln!(
        out,
        "{} succeeded, {} failed, {} cancelled, {} not started",
        summary.count(FinishedState::FinishedWithSuccess),
        summary.count(FinishedState::FinishedWithError),
        summary.count(FinishedState::FinishedCancelled),
        summary.count(FinishedState::NotStarted),
    );
    if summary.cancelled {
        out.push_str("run was cancelled\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use batchdl_core::workflow::ItemRow;

    #[test]
    fn table_lists_rows_and_totals() {
        let summary = RunSummary {
            all_finished: false,
            success: false,
            cancelled: true,
            items: vec![
                ItemRow {
                    index: 0,
                    url: "https://a/1".into(),
                    title: Some("First".into()),
                    state: FinishedState::FinishedWithSuccess,
                },
                ItemRow {
                    index: 1,
                    url: "https://a/2".into(),
                    title: None,
                    state: FinishedState::FinishedCancelled,
                },
            ],
        };
        let table = format_table(&summary);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[1].starts_with("1      FinishedWithSuccess  https://a/1"));
        assert!(lines[2].trim_start().starts_with("First"));
        assert!(lines[3].contains("FinishedCancelled"));
        assert_eq!(lines[4], "1 succeeded, 0 failed, 1 cancelled, 0 not started");
        assert_eq!(lines[5], "run was cancelled");
    }
}
