use crate::reports::RenderOptions;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "kpi-dashboards",
    version,
    about = "Executive KPI dashboards over fourteen CSV datasets"
)]
pub struct Cli {
    /// Folder holding the dataset CSV files
    #[arg(
        long,
        global = true,
        env = "KPI_DASHBOARDS_DATA_DIR",
        default_value = "."
    )]
    pub data_dir: PathBuf,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    /// More log output on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render one question's dashboard
    Show {
        /// `Question N` or just `N`
        question: String,
        #[command(flatten)]
        render: RenderArgs,
        /// Also write the KPI strip to this CSV file
        #[arg(long)]
        kpi_out: Option<PathBuf>,
        /// Also write the chart description to this JSON file
        #[arg(long)]
        chart_out: Option<PathBuf>,
    },
    /// List the questions and the dashboard each opens
    List,
    /// Verify and load every dataset file
    Check,
    /// Pick questions from a menu until you quit (the default)
    Interactive {
        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Rows shown in the chart preview of line and scatter charts
    #[arg(long, default_value_t = 10)]
    pub preview_rows: usize,
    /// Print the "not implemented" notice under every dashboard as well
    #[arg(long, default_value_t = false)]
    pub always_show_fallback: bool,
}

impl Default for RenderArgs {
    fn default() -> Self {
        let opts = RenderOptions::default();
        Self {
            preview_rows: opts.preview_rows,
            always_show_fallback: opts.always_show_fallback,
        }
    }
}

impl From<&RenderArgs> for RenderOptions {
    fn from(args: &RenderArgs) -> Self {
        RenderOptions {
            preview_rows: args.preview_rows,
            always_show_fallback: args.always_show_fallback,
        }
    }
}
