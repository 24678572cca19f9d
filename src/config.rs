use crate::reports::DEFAULT_TOP_EVENTS;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "storm_report")]
#[command(
    about = "Rank storm event types by health and economic impact",
    long_about = None
)]
pub struct ReportConfig {
    /// Storm event table (CSV, plain or gzip/bzip2 compressed)
    #[arg(
        value_name = "FILE",
        env = "STORM_DATA_PATH",
        default_value = "repdata_StormData.csv.bz2"
    )]
    pub input: PathBuf,

    /// Directory for CSV, JSON and SVG outputs
    #[arg(short, long, default_value = "reports")]
    pub output_dir: PathBuf,

    /// Number of event types kept in each ranking
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_EVENTS)]
    pub top: usize,

    /// Rows shown in each console preview table
    #[arg(long, default_value_t = 6)]
    pub preview_rows: usize,

    /// Skip SVG chart rendering
    #[arg(long, default_value_t = false)]
    pub no_charts: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
