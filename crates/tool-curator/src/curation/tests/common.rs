use std::sync::Arc;

use axum::response::Response;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;

use crate::curation::{
    CandidateTool, CurationConfig, CurationPipeline, CurationService, CurationSettings,
    DeliveryChannel,
};
use crate::experiments::ExperimentLedger;
use crate::storage::MemoryStore;

pub(super) type LedgerStore = MemoryStore<ExperimentLedger>;

pub(super) fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Scores at the top of every metric and matches GetResponse by category.
pub(super) fn strong_tool() -> CandidateTool {
    CandidateTool {
        pricing: Some("Freemium".to_string()),
        documentation: Some("https://smartmail.ai/docs".to_string()),
        api_available: true,
        ..CandidateTool::new(
            "SmartMail AI",
            "AI email automation platform with analytics dashboard, API access, and trusted \
             support for marketing teams.",
            "https://smartmail.ai",
        )
        .with_features(["Email Automation", "Analytics Dashboard", "API Access"])
    }
}

pub(super) fn weak_tool() -> CandidateTool {
    CandidateTool::new("x", "tool", "http://example.org")
}

pub(super) fn chatgpt() -> CandidateTool {
    CandidateTool::new(
        "ChatGPT",
        "ChatGPT is an AI assistant for productivity and workflow automation with API \
         integration, secure enterprise support, and detailed documentation for teams.",
        "chat.openai.com",
    )
    .with_features(["Text Generation", "Conversation", "Code Assistance"])
}

pub(super) fn configure(adjust: impl FnOnce(&mut CurationSettings)) -> CurationConfig {
    let mut settings = CurationSettings::default();
    adjust(&mut settings);
    CurationConfig::try_from(settings).expect("valid settings")
}

pub(super) fn static_site_pipeline() -> CurationPipeline {
    CurationPipeline::new(configure(|settings| {
        settings.promotion.channel = DeliveryChannel::StaticSite;
    }))
}

pub(super) fn memory_service() -> Arc<CurationService<LedgerStore>> {
    Arc::new(CurationService::from_config(
        CurationConfig::default(),
        Arc::new(LedgerStore::default()),
    ))
}

pub(super) fn tool_json(tool: &CandidateTool) -> Value {
    serde_json::to_value(tool).expect("tool serializes")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn approx(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}
