//! Decision core for discovered AI tools: quality scoring, affiliate program
//! matching, outbound link and promotional text formatting, and A/B variant
//! selection, aggregated into one [`DecisionRecord`] per tool.
//!
//! Everything under this module is synchronous and free of I/O. Stateful
//! collaborators (experiments, posting, analytics) live in sibling modules and
//! reach storage through injected stores.

pub mod config;
pub mod domain;
pub mod formatting;
pub mod matching;
pub mod pipeline;
pub mod report;
pub mod router;
pub mod scoring;
pub(crate) mod text;
pub mod variants;

#[cfg(test)]
mod tests;

pub use config::{CurationConfig, CurationConfigError, CurationSettings, MatchingSettings};
pub use domain::{
    slugify, AffiliateProgram, CandidateTool, EngagementMetrics, MetricScores, QualityMetric,
    ANONYMOUS_LABEL,
};
pub use formatting::{
    build_link, build_promotional_text, classify, default_variants, hashtags, normalize_url,
    DeliveryChannel, PromoVariant, PromotionConfig, ToolCategory,
};
pub use matching::{default_programs, match_program, MatchResult, MatchRule, ProgramMatcher};
pub use pipeline::CurationPipeline;
pub use report::{BatchReport, DecisionRecord, ItemError};
pub use router::{curation_router, CurationService, DecisionRequest};
pub use scoring::{KeywordVocabulary, MetricWeights, QualityScorer, ScoreResult, ScoringConfig};
pub use variants::{determine_winner, ExperimentConfig, VariantSelector, VariantStats};
