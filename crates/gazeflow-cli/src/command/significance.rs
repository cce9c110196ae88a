use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use gazeflow_stats::{
    footnote::footnote_text,
    significance::{SampleGroup, SignificanceConfig, SignificanceResult, significance},
};

use crate::util::{Output, read_json_file};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SignificanceArg {
    /// Named sample groups (JSON array of {name, values})
    #[arg(long)]
    groups: PathBuf,
    /// Label for the whole comparison context
    #[arg(long, default_value = "TFD")]
    cluster: String,
    /// Treat the groups as per-respondent repeated measures
    #[arg(long)]
    paired: bool,
    /// Significance level for assumption checks and omnibus gating
    #[arg(long, default_value_t = 0.05)]
    alpha: f64,
    /// Highest p-value still flagged in footnotes
    #[arg(long, default_value_t = 0.055)]
    report_cutoff: f64,
    /// Iterations for the permutation fallback
    #[arg(long, default_value_t = 10_000)]
    bootstrap_iterations: u32,
    /// Seed for the permutation fallback
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
struct GroupRecord {
    name: String,
    values: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct SignificanceReport {
    cluster: String,
    results: Vec<SignificanceResult>,
    footnote: String,
}

pub(crate) fn run(arg: &SignificanceArg) -> anyhow::Result<()> {
    let records: Vec<GroupRecord> = read_json_file("sample groups", &arg.groups)?;
    let groups: Vec<SampleGroup> = records
        .into_iter()
        .map(|record| SampleGroup::new(record.name, record.values))
        .collect();

    let config = SignificanceConfig {
        alpha: arg.alpha,
        report_cutoff: arg.report_cutoff,
        bootstrap_iterations: arg.bootstrap_iterations,
        seed: arg.seed,
    };

    let results = significance(&groups, &arg.cluster, arg.paired, &config);
    let report = SignificanceReport {
        cluster: arg.cluster.clone(),
        footnote: footnote_text(&results, &config),
        results,
    };
    Output::save_json(&report, arg.output.clone())
}
