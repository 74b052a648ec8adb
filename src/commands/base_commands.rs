use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FeedArgs {
    /// Path to a dashboard config YAML
    #[arg(short, long)]
    pub config: Option<String>,
    /// Feed URL, overrides the config
    #[arg(short, long)]
    pub url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the national grid feed and print the snapshot table
    Snapshot {
        #[command(flatten)]
        feed: FeedArgs,
    },
    /// Print the snapshot and the per-city load allocation
    Allocate {
        #[command(flatten)]
        feed: FeedArgs,
    },
    /// Run one refresh cycle and print per-city load forecasts
    Forecast {
        #[command(flatten)]
        feed: FeedArgs,
        /// Only forecast this city
        #[arg(long)]
        city: Option<String>,
        /// Optional output YAML file for the full report
        #[arg(short, long)]
        output: Option<String>,
        /// Seed for the synthetic history generator
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Re-run the refresh cycle on a fixed interval
    Watch {
        #[command(flatten)]
        feed: FeedArgs,
        /// Stop after this many cycles
        #[arg(short = 'n', long)]
        cycles: Option<usize>,
        /// Seconds between cycles, overrides the config
        #[arg(short, long)]
        interval_secs: Option<u64>,
        /// Seed for the synthetic history generator
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
