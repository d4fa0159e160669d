mod advice;
mod config;
mod rules;

pub use config::{KeywordVocabulary, MetricWeights, ScoringConfig};

use serde::{Deserialize, Serialize};

use super::config::CurationConfigError;
use super::domain::{CandidateTool, MetricScores};

#[cfg(test)]
pub(crate) use rules::rule_for_tests;

/// Stateless scorer that applies a validated rubric to candidate tools.
#[derive(Debug, Clone)]
pub struct QualityScorer {
    config: ScoringConfig,
}

impl QualityScorer {
    pub fn new(mut config: ScoringConfig) -> Result<Self, CurationConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Wraps a rubric already known to be valid, such as the built-in defaults.
    pub(crate) fn from_validated(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, tool: &CandidateTool) -> ScoreResult {
        let metrics = rules::score_metrics(tool, &self.config);
        let overall_score = rules::clamp_unit(
            metrics
                .iter()
                .map(|(metric, score)| score * self.config.weights.get(*metric))
                .sum(),
        );
        let suggestions = advice::suggestions_for(tool, &metrics, self.config.suggestion_floor);

        ScoreResult {
            metrics,
            overall_score,
            passed: overall_score >= self.config.min_score_threshold,
            suggestions,
        }
    }
}

/// Outcome of scoring a single tool. Rescoring produces a fresh value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub metrics: MetricScores,
    pub overall_score: f64,
    pub passed: bool,
    pub suggestions: Vec<String>,
}

impl ScoreResult {
    pub fn summary(&self) -> String {
        if self.passed {
            format!("passed with overall score {:.2}", self.overall_score)
        } else if self.suggestions.is_empty() {
            format!("below threshold with overall score {:.2}", self.overall_score)
        } else {
            format!(
                "below threshold with overall score {:.2}: {}",
                self.overall_score,
                self.suggestions.join("; ")
            )
        }
    }
}
