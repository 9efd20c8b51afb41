use super::print_title;
use crate::collect::collect;
use crate::config::Config;
use crate::metrics::{analyze, RepositoryReport};
use crate::model::Output;
use chrono::Utc;
use console::style;

const LOG_PREVIEW: usize = 10;

pub fn exec(config: &Config, json: bool) -> anyhow::Result<()> {
    let collected = collect(config)?;
    let report = analyze(
        &collected.commits,
        collected.repository.clone(),
        &collected.range,
        Utc::now(),
    );

    if json {
        let output = Output::bare(&collected.range, &report);
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    } else {
        print_title("Report", &collected.repository, &collected.range);
        output_table(&report);
        Ok(())
    }
}

fn output_table(report: &RepositoryReport) {
    super::summary::output_table(&report.summary, report.filtered.as_ref());

    println!("\n{}", style("Timeline").bold());
    super::timeline::output_table(&report.timeline);

    println!("\n{}", style("Contributors").bold());
    super::contributors::output_table(&report.contributors);

    println!("\n{}", style("Files").bold());
    super::files::output_table(&report.file_analysis);

    println!("\n{}", style("Recent commits").bold());
    let shown = report.commits.len().min(LOG_PREVIEW);
    super::log::output_table(&report.commits[..shown]);
}
