use serde::{Deserialize, Serialize};

use super::domain::CandidateTool;
use super::formatting::ToolCategory;
use super::matching::MatchResult;
use super::scoring::ScoreResult;

/// Per-tool aggregate handed to publishers and posters. Never persisted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Index of the tool in the submitted batch.
    pub position: usize,
    pub label: String,
    pub slug: String,
    pub tool: CandidateTool,
    pub score: ScoreResult,
    #[serde(rename = "match")]
    pub match_result: MatchResult,
    pub outbound_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotional_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub category: ToolCategory,
}

impl DecisionRecord {
    pub fn passed(&self) -> bool {
        self.score.passed
    }

    pub fn program_name(&self) -> Option<&str> {
        self.match_result.program_name()
    }
}

/// Item that could not be turned into a decision, reported next to the successes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    pub index: usize,
    pub label: String,
    pub message: String,
}

/// Outcome of one batch: decisions in input order plus isolated item failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub records: Vec<DecisionRecord>,
    pub errors: Vec<ItemError>,
}

impl BatchReport {
    pub fn publishable(&self) -> impl Iterator<Item = &DecisionRecord> + '_ {
        self.records.iter().filter(|record| record.passed())
    }

    pub fn passed_count(&self) -> usize {
        self.publishable().count()
    }

    pub fn matched_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.match_result.is_match())
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Drops non-passing records, keeping errors untouched.
    pub fn retain_passing(&mut self) {
        self.records.retain(DecisionRecord::passed);
    }
}
