use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wordburn::config::TrackerConfig;
use wordburn::menu;
use wordburn::store::Store;

#[derive(Debug, Parser)]
#[command(name = "wordburn", version, about = "Burndown tracking for writing projects")]
struct Cli {
    /// Path to the shared CSV data file.
    #[arg(long, env = "WORDBURN_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = TrackerConfig::resolve(cli.data_file)?;
    tracing::debug!(data_file = %config.data_file.display(), "resolved configuration");

    let store = Store::new(&config.data_file);
    menu::run(&config, &store)
}

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "warn",
        1 => "wordburn=debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // Logs go to stderr so they never interleave with the chart.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
