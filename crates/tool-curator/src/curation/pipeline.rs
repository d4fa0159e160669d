use rand::Rng;
use serde_json::Value;

use super::config::CurationConfig;
use super::domain::{slugify, CandidateTool, ANONYMOUS_LABEL};
use super::formatting::{build_link, build_promotional_text, classify, DeliveryChannel};
use super::matching::MatchResult;
use super::report::{BatchReport, DecisionRecord, ItemError};
use super::variants::VariantSelector;

/// Scores, matches, and formats a batch of candidate tools.
///
/// Passing tools are matched and formatted; failing tools still produce a
/// record carrying their score, no match, and the normalized URL.
#[derive(Debug, Clone, Default)]
pub struct CurationPipeline {
    config: CurationConfig,
}

impl CurationPipeline {
    pub fn new(config: CurationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CurationConfig {
        &self.config
    }

    /// Selector over the configured variants, pinned to the configured winner if any.
    pub fn selector(&self) -> VariantSelector {
        VariantSelector::from_config(self.config.promotion())
    }

    pub fn process<R: Rng + ?Sized>(
        &self,
        tools: &[CandidateTool],
        selector: &VariantSelector,
        rng: &mut R,
    ) -> BatchReport {
        let records = tools
            .iter()
            .enumerate()
            .map(|(position, tool)| self.decide(position, tool, selector, rng))
            .collect();

        BatchReport {
            records,
            errors: Vec::new(),
        }
    }

    /// Decodes each raw record independently; undecodable items become
    /// [`ItemError`]s and never stop the rest of the batch.
    pub fn process_raw<R: Rng + ?Sized>(
        &self,
        items: Vec<Value>,
        selector: &VariantSelector,
        rng: &mut R,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        for (index, item) in items.into_iter().enumerate() {
            let label = raw_label(&item);
            match serde_json::from_value::<CandidateTool>(item) {
                Ok(tool) => report.records.push(self.decide(index, &tool, selector, rng)),
                Err(error) => report.errors.push(ItemError {
                    index,
                    label,
                    message: error.to_string(),
                }),
            }
        }

        report
    }

    /// Builds the decision for a single tool.
    pub fn decide<R: Rng + ?Sized>(
        &self,
        position: usize,
        tool: &CandidateTool,
        selector: &VariantSelector,
        rng: &mut R,
    ) -> DecisionRecord {
        let score = self.config.scorer().score(tool);
        let match_result = if score.passed {
            self.config.matcher().match_tool(tool)
        } else {
            MatchResult::none()
        };
        let outbound_link = build_link(&tool.url, match_result.program.as_ref());

        let promotion = self.config.promotion();
        let (variant, promotional_text) =
            if score.passed && promotion.channel == DeliveryChannel::Social {
                match selector.select(rng) {
                    Some(variant) => (
                        Some(variant.name.clone()),
                        Some(build_promotional_text(
                            tool,
                            &outbound_link,
                            variant,
                            promotion,
                        )),
                    ),
                    None => (None, None),
                }
            } else {
                (None, None)
            };

        let label = tool.label().to_string();
        let slug = match slugify(&label) {
            slug if slug.is_empty() => format!("tool-{position}"),
            slug => slug,
        };

        DecisionRecord {
            position,
            label,
            slug,
            tool: tool.clone(),
            score,
            match_result,
            outbound_link,
            promotional_text,
            variant,
            category: classify(tool),
        }
    }
}

fn raw_label(item: &Value) -> String {
    item.get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(ANONYMOUS_LABEL)
        .to_string()
}
