use std::io::Write;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tool_curator::config::CurationSource;
use tool_curator::curation::{CurationPipeline, DeliveryChannel, ToolCategory};
use tool_curator::discovery::{ToolFormat, ToolImporter};

const CSV_EXPORT: &str = "name,description,url,features,category,pricing,documentation,api_available\n\
SmartMail AI,\"AI email automation platform with analytics dashboard, API access, and trusted support for marketing teams.\",https://smartmail.ai,Email Automation;Analytics Dashboard;API Access,Email,Freemium,https://smartmail.ai/docs,yes\n\
x,tool,http://example.org,,,,,\n";

#[test]
fn csv_export_flows_through_the_pipeline() {
    let items = ToolImporter::from_reader(CSV_EXPORT.as_bytes(), ToolFormat::Csv)
        .expect("csv imports");
    assert_eq!(items.len(), 2);

    let pipeline = CurationPipeline::default();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let report = pipeline.process_raw(items, &pipeline.selector(), &mut rng);

    assert!(report.is_clean());
    assert_eq!(report.records.len(), 2);

    let smartmail = &report.records[0];
    assert!(smartmail.passed());
    assert!(smartmail.tool.api_available);
    assert_eq!(smartmail.tool.features.len(), 3);
    assert_eq!(smartmail.program_name(), Some("GetResponse"));
    assert_eq!(smartmail.category, ToolCategory::Email);
    assert!(smartmail
        .promotional_text
        .as_deref()
        .expect("text")
        .contains("#EmailMarketing"));

    let weak = &report.records[1];
    assert!(!weak.passed());
    assert!(weak.tool.features.is_empty());
    assert!(weak.tool.category.is_none());
    assert_eq!(report.publishable().count(), 1);
}

#[test]
fn json_file_with_bad_items_reports_them_beside_the_decisions() {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("tempfile");
    write!(
        file,
        r#"{{ "tools": [
            {{ "name": "Claude", "description": "Advanced AI assistant for various tasks.",
               "url": "https://anthropic.com/claude",
               "features": ["Text Generation", "Analysis", "Research"],
               "pricing": "Free/Premium" }},
            {{ "name": "Broken", "api_available": "sometimes" }}
        ] }}"#
    )
    .expect("write export");

    let items = ToolImporter::from_path(file.path(), None).expect("json imports");
    let pipeline = CurationPipeline::default();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let report = pipeline.process_raw(items, &pipeline.selector(), &mut rng);

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].label, "Claude");
    assert!(report.records[0].passed());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].index, 1);
    assert_eq!(report.errors[0].label, "Broken");
}

#[test]
fn settings_document_switches_to_static_site_delivery() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("curation.json");
    std::fs::write(
        &path,
        r#"{
            "scoring": { "min_score_threshold": 0.62 },
            "promotion": { "channel": "static_site" }
        }"#,
    )
    .expect("write settings");

    let source = CurationSource {
        settings_path: Some(path),
        min_quality_score: None,
        data_dir: dir.path().to_path_buf(),
    };
    let config = source.load().expect("settings load");
    assert_eq!(config.promotion().channel, DeliveryChannel::StaticSite);

    let pipeline = CurationPipeline::new(config);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let report = pipeline.process(
        &tool_curator::discovery::sample_tools(),
        &pipeline.selector(),
        &mut rng,
    );

    let passed: Vec<_> = report.publishable().map(|r| r.label.as_str()).collect();
    assert_eq!(passed, vec!["DALL-E 3", "Claude", "Midjourney", "GitHub Copilot"]);
    assert!(report.records.iter().all(|r| r.promotional_text.is_none()));
}

#[test]
fn unsupported_extension_is_rejected() {
    let file = tempfile::Builder::new()
        .suffix(".xml")
        .tempfile()
        .expect("tempfile");
    let error = ToolImporter::from_path(file.path(), None).expect_err("xml rejected");
    assert!(error.to_string().contains("xml"));
}
