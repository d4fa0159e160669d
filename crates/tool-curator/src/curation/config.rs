use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{AffiliateProgram, QualityMetric};
use super::formatting::PromotionConfig;
use super::matching::{default_programs, ProgramMatcher};
use super::scoring::{QualityScorer, ScoringConfig};
use super::variants::ExperimentConfig;

/// Affiliate program list and whether an empty list is acceptable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingSettings {
    pub required: bool,
    pub programs: Vec<AffiliateProgram>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            required: true,
            programs: default_programs(),
        }
    }
}

/// Raw curation settings as read from a JSON document; every section is defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurationSettings {
    pub scoring: ScoringConfig,
    pub matching: MatchingSettings,
    pub promotion: PromotionConfig,
    pub experiment: ExperimentConfig,
}

impl CurationSettings {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CurationConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| CurationConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(std::io::BufReader::new(file)).map_err(|source| {
            CurationConfigError::Parse {
                path: path.display().to_string(),
                source,
            }
        })
    }
}

/// Validated, immutable configuration for one curation run.
///
/// The only way to obtain one is through [`CurationConfig::try_from`], so every
/// consumer can rely on weights summing to one and thresholds being in range.
#[derive(Debug, Clone)]
pub struct CurationConfig {
    scorer: QualityScorer,
    matcher: ProgramMatcher,
    promotion: PromotionConfig,
    experiment: ExperimentConfig,
}

impl CurationConfig {
    pub fn scorer(&self) -> &QualityScorer {
        &self.scorer
    }

    pub fn scoring(&self) -> &ScoringConfig {
        self.scorer.config()
    }

    pub fn matcher(&self) -> &ProgramMatcher {
        &self.matcher
    }

    pub fn programs(&self) -> &[AffiliateProgram] {
        self.matcher.programs()
    }

    pub fn promotion(&self) -> &PromotionConfig {
        &self.promotion
    }

    pub fn experiment(&self) -> &ExperimentConfig {
        &self.experiment
    }

    /// Copy of this configuration with a concluded experiment winner pinned.
    pub fn with_winner(&self, winner: Option<String>) -> Result<Self, CurationConfigError> {
        let mut promotion = self.promotion.clone();
        promotion.winner = winner;
        promotion.validate()?;
        Ok(Self {
            promotion,
            ..self.clone()
        })
    }
}

impl TryFrom<CurationSettings> for CurationConfig {
    type Error = CurationConfigError;

    fn try_from(settings: CurationSettings) -> Result<Self, Self::Error> {
        let CurationSettings {
            scoring,
            matching,
            promotion,
            experiment,
        } = settings;

        let scorer = QualityScorer::new(scoring)?;
        if matching.required && matching.programs.is_empty() {
            return Err(CurationConfigError::NoPrograms);
        }
        let matcher = ProgramMatcher::new(matching.programs)?;
        promotion.validate()?;
        experiment.validate()?;

        Ok(Self {
            scorer,
            matcher,
            promotion,
            experiment,
        })
    }
}

impl Default for CurationConfig {
    fn default() -> Self {
        let defaults = CurationSettings::default();
        Self {
            scorer: QualityScorer::from_validated(defaults.scoring),
            matcher: ProgramMatcher::from_normalized(defaults.matching.programs),
            promotion: defaults.promotion,
            experiment: defaults.experiment,
        }
    }
}

/// Fatal configuration problems, raised before any batch is processed.
#[derive(Debug, thiserror::Error)]
pub enum CurationConfigError {
    #[error("weight for metric '{0}' is missing")]
    MissingWeight(QualityMetric),
    #[error("weight for metric '{metric}' must be a non-negative number, got {value}")]
    InvalidWeight { metric: QualityMetric, value: f64 },
    #[error("metric weights must sum to 1.0, got {0:.6}")]
    WeightSum(f64),
    #[error("{field} must be between 0 and 1, got {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
    #[error("at least one affiliate program is required")]
    NoPrograms,
    #[error("affiliate program '{program}' is invalid: {reason}")]
    InvalidProgram {
        program: String,
        reason: &'static str,
    },
    #[error("at least one promotional variant is required")]
    NoVariants,
    #[error("promotional variant '{0}' needs a name and a template")]
    InvalidVariant(String),
    #[error("promotional variant '{0}' is declared more than once")]
    DuplicateVariant(String),
    #[error("configured winner '{0}' is not a declared variant")]
    UnknownWinner(String),
    #[error("experiment name must not be blank")]
    BlankExperimentName,
    #[error("unable to read curation settings from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid curation settings in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
