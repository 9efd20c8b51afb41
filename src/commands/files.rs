use super::{fit, output_json, output_ndjson, print_title, windowed, RULE_WIDTH};
use crate::collect::collect;
use crate::config::Config;
use crate::metrics::{analyze_file_changes, FileChangeReport};
use console::style;

pub fn exec(config: &Config, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let collected = collect(config)?;
    let report = analyze_file_changes(&windowed(&collected));

    if json {
        output_json(&collected.repository, &collected.range, &report)
    } else if ndjson {
        output_ndjson(&report.most_modified_files)
    } else {
        print_title("Files", &collected.repository, &collected.range);
        output_table(&report);
        Ok(())
    }
}

pub(crate) fn output_table(report: &FileChangeReport) {
    if report.most_modified_files.is_empty() {
        println!("No data to display");
        return;
    }

    println!(
        "{:<44} {:>6} {:>8} {:>8} {:>7}",
        style("Path").bold(),
        style("Mods").bold(),
        style("Added").bold(),
        style("Deleted").bold(),
        style("Authors").bold()
    );
    println!("{}", "─".repeat(RULE_WIDTH));
    for f in &report.most_modified_files {
        println!(
            "{:<44} {:>6} {:>8} {:>8} {:>7}",
            fit(&f.filename, 44),
            f.modifications,
            f.additions,
            f.deletions,
            f.authors
        );
    }

    println!();
    println!(
        "{:<16} {:>6} {:>6} {:>8} {:>8}",
        style("Extension").bold(),
        style("Files").bold(),
        style("Mods").bold(),
        style("Added").bold(),
        style("Deleted").bold()
    );
    println!("{}", "─".repeat(48));
    for t in &report.file_type_analysis {
        println!(
            "{:<16} {:>6} {:>6} {:>8} {:>8}",
            fit(&t.extension, 16),
            t.files,
            t.modifications,
            t.additions,
            t.deletions
        );
    }

    println!("\n{} unique files", report.total_unique_files);
}
