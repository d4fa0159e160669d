use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::config::CurationConfigError;
use super::super::domain::QualityMetric;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weight per metric; validated to cover every metric and sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricWeights(BTreeMap<QualityMetric, f64>);

impl MetricWeights {
    pub fn new<I>(weights: I) -> Result<Self, CurationConfigError>
    where
        I: IntoIterator<Item = (QualityMetric, f64)>,
    {
        let weights = Self(weights.into_iter().collect());
        weights.validate()?;
        Ok(weights)
    }

    pub fn get(&self, metric: QualityMetric) -> f64 {
        self.0.get(&metric).copied().unwrap_or(0.0)
    }

    pub fn sum(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QualityMetric, f64)> + '_ {
        self.0.iter().map(|(metric, weight)| (*metric, *weight))
    }

    pub(crate) fn validate(&self) -> Result<(), CurationConfigError> {
        for metric in QualityMetric::ALL {
            match self.0.get(&metric) {
                None => return Err(CurationConfigError::MissingWeight(metric)),
                Some(weight) if !weight.is_finite() || *weight < 0.0 => {
                    return Err(CurationConfigError::InvalidWeight {
                        metric,
                        value: *weight,
                    })
                }
                Some(_) => {}
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(CurationConfigError::WeightSum(sum));
        }
        Ok(())
    }
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self(BTreeMap::from([
            (QualityMetric::DescriptionQuality, 0.30),
            (QualityMetric::NameQuality, 0.10),
            (QualityMetric::UrlQuality, 0.15),
            (QualityMetric::KeywordRelevance, 0.25),
            (QualityMetric::FeatureCompleteness, 0.20),
        ]))
    }
}

/// Keyword sets consulted by the description, name, url, and relevance rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordVocabulary {
    pub high_value: Vec<String>,
    pub features: Vec<String>,
    pub trust: Vec<String>,
    pub name_terms: Vec<String>,
    pub trusted_tlds: Vec<String>,
}

impl KeywordVocabulary {
    /// Domain vocabulary across all keyword groups, in declaration order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> + '_ {
        self.high_value
            .iter()
            .chain(&self.features)
            .chain(&self.trust)
            .map(String::as_str)
    }

    pub(crate) fn normalize(&mut self) {
        for group in [
            &mut self.high_value,
            &mut self.features,
            &mut self.trust,
            &mut self.name_terms,
            &mut self.trusted_tlds,
        ] {
            for entry in group.iter_mut() {
                *entry = entry.trim().to_lowercase();
            }
            group.retain(|entry| !entry.is_empty());
        }
    }
}

impl Default for KeywordVocabulary {
    fn default() -> Self {
        fn words(list: &[&str]) -> Vec<String> {
            list.iter().map(|word| word.to_string()).collect()
        }

        Self {
            high_value: words(&[
                "ai",
                "machine learning",
                "neural",
                "automation",
                "productivity",
                "workflow",
                "integration",
            ]),
            features: words(&[
                "api",
                "dashboard",
                "analytics",
                "customizable",
                "scalable",
                "secure",
                "enterprise",
            ]),
            trust: words(&[
                "trusted",
                "verified",
                "secure",
                "guaranteed",
                "money-back",
                "support",
                "documentation",
            ]),
            name_terms: words(&["ai", "ml", "bot", "auto", "smart", "intel"]),
            trusted_tlds: words(&[".io", ".ai", ".com"]),
        }
    }
}

/// Scoring rubric: weights, pass threshold, and the knobs of each metric rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: MetricWeights,
    pub min_score_threshold: f64,
    pub min_description_length: usize,
    pub keyword_target: usize,
    pub min_features: usize,
    pub suggestion_floor: f64,
    pub vocabulary: KeywordVocabulary,
}

impl ScoringConfig {
    pub(crate) fn validate(&mut self) -> Result<(), CurationConfigError> {
        self.weights.validate()?;
        check_unit_interval("min_score_threshold", self.min_score_threshold)?;
        check_unit_interval("suggestion_floor", self.suggestion_floor)?;
        for (field, value) in [
            ("min_description_length", self.min_description_length),
            ("keyword_target", self.keyword_target),
            ("min_features", self.min_features),
        ] {
            if value == 0 {
                return Err(CurationConfigError::ZeroLimit(field));
            }
        }
        self.vocabulary.normalize();
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: MetricWeights::default(),
            min_score_threshold: 0.6,
            min_description_length: 50,
            keyword_target: 5,
            min_features: 3,
            suggestion_floor: 0.7,
            vocabulary: KeywordVocabulary::default(),
        }
    }
}

fn check_unit_interval(field: &'static str, value: f64) -> Result<(), CurationConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CurationConfigError::OutOfRange { field, value })
    }
}
