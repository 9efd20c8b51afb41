use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "commitscope")]
#[command(about = "Commit history metrics: summary, timeline, contributors, file churn and exports")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug, Default)]
pub struct CommonArgs {
    #[arg(long, global = true, env = "COMMITSCOPE_REPO", help = "Path to git repository")]
    pub repo: Option<PathBuf>,

    #[arg(long, global = true, env = "COMMITSCOPE_CACHE", help = "Directory for the commit cache")]
    pub cache: Option<PathBuf>,

    #[arg(long, global = true, env = "COMMITSCOPE_NO_CACHE", help = "Do not read or write the commit cache")]
    pub no_cache: bool,

    #[arg(long, global = true, help = "Skip merge commits")]
    pub no_merges: bool,

    #[arg(long, global = true, help = "Include binary files", default_value_t = false)]
    pub binary: bool,

    #[arg(
        long,
        global = true,
        conflicts_with = "reflog",
        help = "Read commits from a JSON file instead of a repository ('-' for stdin)"
    )]
    pub input: Option<PathBuf>,

    #[arg(long, global = true, help = "Scrape commits from the repository's reflog files")]
    pub reflog: bool,

    #[arg(long, global = true, env = "COMMITSCOPE_NAME", help = "Repository name shown in reports")]
    pub name: Option<String>,

    #[arg(long, global = true, help = "Start from this commit or date (RFC3339, YYYY-MM-DD, '2 weeks ago', '90d')")]
    pub since: Option<String>,

    #[arg(long, global = true, help = "End at this commit or date (RFC3339, YYYY-MM-DD, '2 weeks ago', '90d')")]
    pub until: Option<String>,

    #[arg(
        long,
        global = true,
        value_enum,
        conflicts_with_all = ["since", "until"],
        help = "Quick date filter"
    )]
    pub period: Option<Period>,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "More log output (-v info, -vv debug)")]
    pub verbose: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Period {
    #[value(name = "7days")]
    Week,
    #[value(name = "30days")]
    Month,
    #[value(name = "90days")]
    Quarter,
    Year,
    All,
}

impl Period {
    /// Length of the window ending now, `None` for all time.
    pub fn days(self) -> Option<i64> {
        match self {
            Period::Week => Some(7),
            Period::Month => Some(30),
            Period::Quarter => Some(90),
            Period::Year => Some(365),
            Period::All => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    Ndjson,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Headline totals, frequency, productivity and size estimate
    Summary {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Per-day activity
    Timeline {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// Per-author statistics
    Contributors {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// Most modified files and extension breakdown
    Files {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// Commit list with previews and relative dates
    Log {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(long, short = 'n', help = "Show at most this many commits")]
        limit: Option<usize>,
    },
    /// Every section at once
    Report {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Write the report or the commit list to a file or stdout
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        #[arg(long, short = 'o', help = "Write to this file instead of stdout")]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        let config = crate::config::Config::from_args(&self.common)?;
        match self.command {
            Commands::Summary { json } => crate::commands::summary::exec(&config, json),
            Commands::Timeline { json, ndjson } => {
                crate::commands::timeline::exec(&config, json, ndjson)
            }
            Commands::Contributors { json, ndjson } => {
                crate::commands::contributors::exec(&config, json, ndjson)
            }
            Commands::Files { json, ndjson } => crate::commands::files::exec(&config, json, ndjson),
            Commands::Log { json, ndjson, limit } => {
                crate::commands::log::exec(&config, json, ndjson, limit)
            }
            Commands::Report { json } => crate::commands::report::exec(&config, json),
            Commands::Export { format, output } => {
                crate::export::exec(&config, format, output.as_deref())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "commitscope",
            "contributors",
            "--json",
            "--input",
            "commits.json",
            "--since",
            "2025-01-01",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.common.input, Some(PathBuf::from("commits.json")));
        assert_eq!(cli.common.since.as_deref(), Some("2025-01-01"));
        assert_eq!(cli.common.verbose, 2);
        assert!(matches!(cli.command, Commands::Contributors { json: true, ndjson: false }));
    }

    #[test]
    fn period_conflicts_with_explicit_bounds() {
        assert!(Cli::try_parse_from(["commitscope", "summary", "--period", "30days", "--since", "2025-01-01"]).is_err());
        let cli = Cli::try_parse_from(["commitscope", "summary", "--period", "90days"]).unwrap();
        assert_eq!(cli.common.period, Some(Period::Quarter));
    }

    #[test]
    fn export_defaults_to_json() {
        let cli = Cli::try_parse_from(["commitscope", "export"]).unwrap();
        assert!(matches!(cli.command, Commands::Export { format: ExportFormat::Json, output: None }));
    }
}
