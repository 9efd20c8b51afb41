use super::{fit, output_json, output_ndjson, print_title, windowed, RULE_WIDTH};
use crate::collect::collect;
use crate::config::Config;
use crate::metrics::{analyze_contributors, ContributorReport};
use console::style;

const TABLE_ROWS: usize = 50;

pub fn exec(config: &Config, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let collected = collect(config)?;
    let report = analyze_contributors(&windowed(&collected));

    if json {
        output_json(&collected.repository, &collected.range, &report)
    } else if ndjson {
        output_ndjson(&report.list)
    } else {
        print_title("Contributors", &collected.repository, &collected.range);
        output_table(&report);
        Ok(())
    }
}

pub(crate) fn output_table(report: &ContributorReport) {
    if report.list.is_empty() {
        println!("No data to display");
        return;
    }

    println!(
        "{:<24} {:>7} {:>8} {:>8} {:>6} {:>7} {:>8}",
        style("Author").bold(),
        style("Commits").bold(),
        style("Added").bold(),
        style("Deleted").bold(),
        style("Files").bold(),
        style("Days").bold(),
        style("Avg size").bold()
    );
    println!("{}", "─".repeat(RULE_WIDTH));
    for c in report.list.iter().take(TABLE_ROWS) {
        let who = if c.name.is_empty() { c.email.as_str() } else { c.name.as_str() };
        println!(
            "{:<24} {:>7} {:>8} {:>8} {:>6} {:>7} {:>8}",
            fit(who, 24),
            c.commits,
            c.additions,
            c.deletions,
            c.files,
            c.active_days,
            c.average_commit_size
        );
    }
    if report.list.len() > TABLE_ROWS {
        println!("\n... and {} more contributors", report.list.len() - TABLE_ROWS);
    }

    let summary = &report.summary;
    if let Some(top) = &summary.top_contributor {
        println!();
        println!(
            "Top contributor: {} with {} commits ({}%)",
            style(top).cyan(),
            summary.top_contributor_commits,
            summary.top_contributor_percentage
        );
    }
}
