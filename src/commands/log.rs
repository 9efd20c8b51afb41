use super::{fit, output_json, output_ndjson, print_title, windowed, RULE_WIDTH};
use crate::collect::collect;
use crate::config::Config;
use crate::format::{format_for_display, FormattedCommit};
use chrono::Utc;
use console::style;
use serde::Serialize;

#[derive(Serialize)]
struct LogBody<'a> {
    commits: &'a [FormattedCommit],
}

pub fn exec(config: &Config, json: bool, ndjson: bool, limit: Option<usize>) -> anyhow::Result<()> {
    let collected = collect(config)?;
    let mut commits = format_for_display(&windowed(&collected), Utc::now());
    if let Some(limit) = limit {
        commits.truncate(limit);
    }

    if json {
        output_json(&collected.repository, &collected.range, LogBody { commits: &commits })
    } else if ndjson {
        output_ndjson(&commits)
    } else {
        print_title("Log", &collected.repository, &collected.range);
        output_table(&commits);
        Ok(())
    }
}

pub(crate) fn output_table(commits: &[FormattedCommit]) {
    if commits.is_empty() {
        println!("No commits");
        return;
    }

    for c in commits {
        let when = c.relative_date.as_deref().unwrap_or("unknown date");
        let changes = match &c.stats {
            Some(s) => format!(
                "{} {}",
                style(format!("+{}", s.additions)).green(),
                style(format!("-{}", s.deletions)).red()
            ),
            None => style("no stats").dim().to_string(),
        };
        println!(
            "{} {:<14} {:<18} {}",
            style(&c.short_id).yellow(),
            when,
            fit(&c.author.name, 18),
            changes
        );
        println!("        {}", c.message_preview);
    }
    println!("{}", "─".repeat(RULE_WIDTH));
    println!("{} commits", commits.len());
}
