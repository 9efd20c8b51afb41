use super::{output_json, print_title};
use crate::collect::collect;
use crate::config::Config;
use crate::metrics::{calculate_date_filtered_metrics, calculate_summary, FilteredMetrics, MetricsSummary};
use console::style;
use serde::Serialize;

#[derive(Serialize)]
struct SummaryBody<'a> {
    summary: &'a MetricsSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    filtered: Option<&'a FilteredMetrics>,
}

pub fn exec(config: &Config, json: bool) -> anyhow::Result<()> {
    let collected = collect(config)?;

    let summary = calculate_summary(&collected.commits);
    let filtered = collected
        .range
        .is_bounded()
        .then(|| calculate_date_filtered_metrics(&collected.commits, &collected.range));

    if json {
        output_json(
            &collected.repository,
            &collected.range,
            SummaryBody {
                summary: &summary,
                filtered: filtered.as_ref(),
            },
        )
    } else {
        print_title("Summary", &collected.repository, &collected.range);
        output_table(&summary, filtered.as_ref());
        Ok(())
    }
}

pub(crate) fn output_table(summary: &MetricsSummary, filtered: Option<&FilteredMetrics>) {
    let row = |label: &str, value: String| println!("{:<22} {}", style(label).bold(), value);

    row("Commits", summary.total_commits.to_string());
    row("Additions", style(format!("+{}", summary.total_additions)).green().to_string());
    row("Deletions", style(format!("-{}", summary.total_deletions)).red().to_string());
    row("Net changes", summary.net_changes.to_string());
    row("Lines of code", summary.total_lines_of_code.to_string());
    row("Files touched", summary.total_files.to_string());
    row("Contributors", summary.contributor_count.to_string());

    let span = &summary.date_range;
    match (&span.start, &span.end) {
        (Some(start), Some(end)) => row(
            "Date range",
            format!("{start} to {end} ({} days)", span.days),
        ),
        _ => row("Date range", "n/a".to_string()),
    }

    let freq = &summary.commit_frequency;
    row(
        "Commit frequency",
        format!("{} / day, {} / week, {} / month", freq.daily, freq.weekly, freq.monthly),
    );
    row("Avg commit size", format!("{} lines", summary.average_commit_size));
    row("Productivity", format!("{:.1}", summary.productivity_score));
    row("Repository size", summary.repository_size_estimate.to_string());

    if let Some(f) = filtered {
        println!();
        println!("{}", style("In selected window").bold());
        row("Commits", f.filtered_commits.to_string());
        row("Additions", style(format!("+{}", f.filtered_additions)).green().to_string());
        row("Deletions", style(format!("-{}", f.filtered_deletions)).red().to_string());
        row("Productivity", format!("{:.1}", f.filtered_productivity));
        if let Some(window) = &f.date_range {
            row("Window length", format!("{} days", window.days));
        }
    }
}
