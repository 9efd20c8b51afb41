use super::{output_json, output_ndjson, print_title, windowed, RULE_WIDTH};
use crate::collect::collect;
use crate::config::Config;
use crate::metrics::{create_timeline, Timeline};
use console::style;

const MAX_BAR: usize = 40;

pub fn exec(config: &Config, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let collected = collect(config)?;
    let timeline = create_timeline(&windowed(&collected));

    if json {
        output_json(&collected.repository, &collected.range, &timeline)
    } else if ndjson {
        output_ndjson(&timeline.daily)
    } else {
        print_title("Timeline", &collected.repository, &collected.range);
        output_table(&timeline);
        Ok(())
    }
}

pub(crate) fn output_table(timeline: &Timeline) {
    if timeline.daily.is_empty() {
        println!("No data to display");
        return;
    }

    let max_commits = timeline.daily.iter().map(|d| d.commits).max().unwrap_or(1).max(1);

    println!(
        "{:<10} {:>7} {:>8} {:>8} {:>7}  {}",
        style("Date").bold(),
        style("Commits").bold(),
        style("Added").bold(),
        style("Deleted").bold(),
        style("Authors").bold(),
        style("Activity").bold()
    );
    println!("{}", "─".repeat(RULE_WIDTH));
    for day in &timeline.daily {
        let width = ((day.commits as f64 / max_commits as f64) * MAX_BAR as f64).ceil() as usize;
        println!(
            "{:<10} {:>7} {:>8} {:>8} {:>7}  {}",
            day.date,
            day.commits,
            day.additions,
            day.deletions,
            day.authors,
            style("█".repeat(width)).green()
        );
    }

    let summary = &timeline.summary;
    println!();
    println!(
        "{} active days, {:.2} commits per active day",
        summary.total_active_days, summary.average_commits_per_day
    );
    if let Some(best) = &summary.most_active_day {
        println!("Most active day: {} ({} commits)", style(&best.date).cyan(), best.commits);
    }
}
