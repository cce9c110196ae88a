use std::path::PathBuf;

use gazeflow_metrics::{
    config::{FixationWindow, MetricsConfig},
    pipeline,
};

use crate::util::{Output, read_streams_file};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct MetricsArg {
    /// Respondent event streams (JSON)
    #[arg(long)]
    events: PathBuf,
    /// Lower fixation-admission bound in ms (strict)
    #[arg(long, default_value_t = 150.0)]
    min_fixation_ms: f64,
    /// Upper fixation-admission bound in ms (strict)
    #[arg(long, default_value_t = 900.0)]
    max_fixation_ms: f64,
    /// Minimum share of respondents fixating an AOI for it to rank
    #[arg(long, default_value_t = 0.5)]
    usage_threshold: f64,
    /// Declared stimulus on-screen duration in ms; trailing events are
    /// clipped when set
    #[arg(long)]
    stimulus_duration_ms: Option<i64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &MetricsArg) -> anyhow::Result<()> {
    let streams = read_streams_file(&arg.events)?;
    let config = MetricsConfig {
        window: FixationWindow {
            min_ms: arg.min_fixation_ms,
            max_ms: arg.max_fixation_ms,
        },
        usage_threshold: arg.usage_threshold,
        stimulus_duration_ms: arg.stimulus_duration_ms,
    };

    let report = pipeline::run_batch(&streams, &config)?;
    Output::save_json(&report, arg.output.clone())
}
