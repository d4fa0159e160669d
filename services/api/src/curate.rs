use crate::infra::seeded_rng;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tool_curator::config::AppConfig;
use tool_curator::curation::CurationPipeline;
use tool_curator::discovery::{ImportError, ToolFormat, ToolImporter};
use tool_curator::error::AppError;
use tool_curator::experiments::{ExperimentLedger, ExperimentTracker};
use tool_curator::storage::JsonFileStore;
use tool_curator::telemetry::{self, LogSink};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct CurateArgs {
    /// CSV or JSON export of discovered tools
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Input format; inferred from the file extension when omitted
    #[arg(long, value_parser = parse_format)]
    pub(crate) format: Option<ToolFormat>,
    /// Seed for variant selection, for reproducible output
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Drop tools below the quality threshold from the report
    #[arg(long, default_value_t = false)]
    pub(crate) only_passing: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExperimentArgs {
    /// Experiment name; defaults to the configured experiment
    #[arg(long)]
    pub(crate) name: Option<String>,
}

fn parse_format(raw: &str) -> Result<ToolFormat, String> {
    raw.parse().map_err(|err: ImportError| err.to_string())
}

fn load_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn run_curate(args: CurateArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let pipeline = CurationPipeline::new(config.curation.load()?);

    let items = ToolImporter::from_path(&args.input, args.format)?;
    let mut rng = seeded_rng(args.seed);
    let mut report = pipeline.process_raw(items, &pipeline.selector(), &mut rng);
    info!(
        input = %args.input.display(),
        records = report.records.len(),
        passed = report.passed_count(),
        errors = report.errors.len(),
        "curation finished"
    );
    if args.only_passing {
        report.retain_passing();
    }

    print_json(&report)
}

type LedgerStore = JsonFileStore<ExperimentLedger>;

fn tracker(config: &AppConfig) -> Result<ExperimentTracker<LedgerStore>, AppError> {
    let curation = config.curation.load()?;
    let store = Arc::new(LedgerStore::new(config.curation.ledger_path("experiments")));
    Ok(ExperimentTracker::from_config(store, &curation))
}

pub(crate) fn show_experiment(args: ExperimentArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let tracker = tracker(&config)?;
    let name = args
        .name
        .unwrap_or_else(|| tracker.default_experiment().to_string());
    print_json(&tracker.status(&name)?)
}

pub(crate) fn list_experiments() -> Result<(), AppError> {
    let config = load_config()?;
    let names = tracker(&config)?.experiments()?;
    if names.is_empty() {
        println!("No experiments recorded yet.");
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parser_accepts_known_formats() {
        assert_eq!(parse_format("JSON"), Ok(ToolFormat::Json));
        assert_eq!(parse_format(" csv "), Ok(ToolFormat::Csv));
        assert!(parse_format("yaml").is_err());
    }
}
