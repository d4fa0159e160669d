use crate::infra::{seeded_rng, ConsoleGateway};
use chrono::Utc;
use clap::Args;
use serde_json::Value;
use std::sync::Arc;
use tool_curator::analytics::{AnalyticsLedger, AnalyticsTracker};
use tool_curator::config::AppConfig;
use tool_curator::curation::{CurationService, DecisionRequest};
use tool_curator::discovery::sample_tools;
use tool_curator::error::AppError;
use tool_curator::experiments::ExperimentLedger;
use tool_curator::publishing::{
    CatalogPublisher, PostHistory, PostOutcome, PromotionPoster, SiteCatalog,
};
use tool_curator::storage::MemoryStore;
use tool_curator::telemetry::{self, LogSink};

/// Flat payout attributed to the first posted tool so revenue reports have data.
const DEMO_CONVERSION_AMOUNT: f64 = 49.0;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Seed for variant selection and synthetic engagement
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;
    let curation = config.curation.load()?;
    let now = Utc::now();

    let service = CurationService::from_config(
        curation,
        Arc::new(MemoryStore::<ExperimentLedger>::default()),
    );
    let tools = sample_tools()
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()?;
    let mut rng = seeded_rng(args.seed);
    let response = service.curate(
        DecisionRequest {
            tools,
            experiment: None,
        },
        &mut rng,
        now,
    )?;
    let report = &response.report;

    println!("Tool curation demo");
    println!(
        "Scored {} tools | {} passed | {} matched an affiliate program",
        report.records.len(),
        report.passed_count(),
        report.matched_count()
    );
    for record in &report.records {
        let verdict = if record.passed() { "pass" } else { "skip" };
        println!(
            "- {} | score {:.3} ({}) | program {} | {}",
            record.label,
            record.score.overall_score,
            verdict,
            record.program_name().unwrap_or("none"),
            record.outbound_link
        );
    }

    println!("\nPosting promotions");
    let gateway = Arc::new(ConsoleGateway::new(seeded_rng(
        args.seed.map(|seed| seed.wrapping_add(1)),
    )));
    let poster = PromotionPoster::new(Arc::new(MemoryStore::<PostHistory>::default()), gateway);
    let outcomes = poster.publish_batch(&report.records, now);

    let analytics = AnalyticsTracker::new(Arc::new(MemoryStore::<AnalyticsLedger>::default()));
    let mut converted = false;
    for outcome in &outcomes {
        let PostOutcome::Posted { label, post_id, .. } = outcome else {
            continue;
        };
        let Some(record) = report.records.iter().find(|record| &record.label == label) else {
            continue;
        };

        analytics.track_post(post_id, record, now)?;
        let metrics = poster.engagement(post_id);
        analytics.update_metrics(post_id, metrics, now)?;
        if !converted && record.match_result.is_match() {
            analytics.track_conversion(post_id, DEMO_CONVERSION_AMOUNT, now)?;
            converted = true;
        }

        if let Some(assignment) = response
            .assignments
            .iter()
            .find(|assignment| assignment.position == record.position)
        {
            service
                .experiments()
                .record_result(&assignment.assignment_id, metrics, now)?;
        }
    }
    let skipped = outcomes
        .iter()
        .filter(|outcome| outcome.post_id().is_none())
        .count();
    println!("Skipped or failed posts: {skipped}");

    let catalog = CatalogPublisher::new(Arc::new(MemoryStore::<SiteCatalog>::default()));
    let update = catalog.update(&report.records, now)?;
    let stats = catalog.stats(now)?;
    let digest = catalog.weekly_digest(now)?;
    println!("\nCatalog");
    println!(
        "Added {} | {} tools across {} categories | average quality {:.3}",
        update.added.len(),
        stats.total_tools,
        stats.categories,
        stats.avg_quality
    );
    println!(
        "Digest {}: {} tools, top category {}",
        digest.id,
        digest.total_tools,
        digest.top_category.as_deref().unwrap_or("none")
    );

    let performance = analytics.performance_report(now, 7)?;
    let revenue = analytics.revenue_report(now)?;
    println!("\nPerformance (last {} days)", performance.period_days);
    println!(
        "Posts {} | conversions {} ({:.0}%) | average engagement {:.1}",
        performance.summary.total_posts,
        performance.summary.total_conversions,
        performance.summary.conversion_rate * 100.0,
        performance.summary.average_engagement
    );
    if let Some(hour) = &performance.engagement.best_posting_hour {
        println!("Best posting hour: {hour}");
    }
    println!("Revenue {:.2}", revenue.total_revenue);
    for (program, amount) in &revenue.by_program {
        println!("- {program}: {amount:.2}");
    }

    if let Some(name) = &response.experiment {
        let status = service.experiments().status(name)?;
        println!("\nExperiment {} ({} samples)", status.name, status.total_samples);
        for variant in &status.variants {
            println!(
                "- {} | samples {} | mean {:.2}",
                variant.variant, variant.samples, variant.mean
            );
        }
        match &status.winner {
            Some(winner) => println!("Winner: {winner}"),
            None => println!("Winner: undecided"),
        }
    }

    Ok(())
}
