use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qmetrics")]
#[command(about = "Quarterly activity metrics for repositories shared across organizations")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Path to JSON config (built-in repository list when omitted)")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity (-v info, -vv debug)")]
    pub verbose: u8,
}

impl CommonArgs {
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge co-owned repositories and bucket raw event dates by quarter
    Aggregate {
        #[arg(long, help = "Raw data fetched per owner", default_value = "data/raw_data.json")]
        raw: PathBuf,

        #[arg(long, help = "Write metrics JSON here instead of stdout")]
        out: Option<PathBuf>,

        #[arg(long, help = "Abort on the first repository that fails")]
        strict: bool,

        #[arg(long, help = "Print the run summary as JSON (with --out)")]
        json: bool,
    },
    /// Lay out aggregated metrics as report sheets
    Report {
        #[arg(long, help = "Aggregated metrics file", default_value = "data/metrics.json")]
        metrics: PathBuf,

        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(long, help = "Abort on the first sheet that fails")]
        strict: bool,
    },
    /// Count comments by external contributors per quarter
    External {
        #[arg(long, help = "Comment list as returned by the GitHub API")]
        comments: PathBuf,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

impl Cli {
    /// Logs go to stderr; `RUST_LOG` overrides the verbosity flag.
    pub fn init_logging(&self) {
        let env = env_logger::Env::default().default_filter_or(self.common.log_filter());
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp(None)
            .try_init();
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Aggregate { raw, out, strict, json } => {
                crate::pipeline::exec(self.common, &raw, out.as_deref(), strict, json)
            }
            Commands::Report { metrics, json, ndjson, strict } => {
                crate::report::exec(self.common, &metrics, json, ndjson, strict)
            }
            Commands::External { comments, json } => {
                crate::contributors::exec(self.common, &comments, json)
            }
        }
    }
}
