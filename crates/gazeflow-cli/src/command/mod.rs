use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{metrics::MetricsArg, significance::SignificanceArg};

mod metrics;
mod significance;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run the attention-metric batch over respondent event streams
    Metrics(#[clap(flatten)] MetricsArg),
    /// Run the significance engine over named sample groups
    Significance(#[clap(flatten)] SignificanceArg),
}

pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = CommandArgs::parse();
    match args.mode {
        Mode::Metrics(arg) => metrics::run(&arg)?,
        Mode::Significance(arg) => significance::run(&arg)?,
    }
    Ok(())
}
