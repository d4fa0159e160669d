//! Promotional variant selection and the winner rule that concludes an experiment.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::CurationConfigError;
use super::formatting::{PromoVariant, PromotionConfig};

/// Experiment thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub name: String,
    pub min_samples: usize,
    pub confidence_z: f64,
}

impl ExperimentConfig {
    pub(crate) fn validate(&self) -> Result<(), CurationConfigError> {
        if self.name.trim().is_empty() {
            return Err(CurationConfigError::BlankExperimentName);
        }
        if self.min_samples == 0 {
            return Err(CurationConfigError::ZeroLimit("min_samples"));
        }
        if !self.confidence_z.is_finite() || self.confidence_z <= 0.0 {
            return Err(CurationConfigError::OutOfRange {
                field: "confidence_z",
                value: self.confidence_z,
            });
        }
        Ok(())
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            name: "tweet_format".to_string(),
            min_samples: 100,
            confidence_z: 1.96,
        }
    }
}

/// Picks the variant for each decision: the winner once one is known,
/// otherwise a uniform draw from the injected random source.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantSelector {
    variants: Vec<PromoVariant>,
    winner: Option<String>,
}

impl VariantSelector {
    pub fn new(variants: Vec<PromoVariant>) -> Self {
        Self {
            variants,
            winner: None,
        }
    }

    pub fn from_config(config: &PromotionConfig) -> Self {
        Self::new(config.variants.clone()).with_winner(config.winner.clone())
    }

    /// Pins selection to `winner` when it names one of the variants.
    pub fn with_winner(mut self, winner: Option<String>) -> Self {
        self.winner = winner.filter(|name| self.variants.iter().any(|v| &v.name == name));
        self
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn variants(&self) -> &[PromoVariant] {
        &self.variants
    }

    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&PromoVariant> {
        if let Some(winner) = &self.winner {
            return self.variants.iter().find(|variant| &variant.name == winner);
        }
        self.variants.choose(rng)
    }
}

/// Sample summary for one variant's engagement scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantStats {
    pub variant: String,
    pub samples: usize,
    pub mean: f64,
    pub stdev: f64,
}

impl VariantStats {
    pub fn from_scores(variant: impl Into<String>, scores: &[f64]) -> Self {
        let samples = scores.len();
        let mean = if samples == 0 {
            0.0
        } else {
            scores.iter().sum::<f64>() / samples as f64
        };
        let stdev = if samples > 1 {
            let variance = scores
                .iter()
                .map(|score| (score - mean).powi(2))
                .sum::<f64>()
                / (samples - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        Self {
            variant: variant.into(),
            samples,
            mean,
            stdev,
        }
    }
}

/// Declares a winner only when every variant has `min_samples` and the
/// highest-mean variant clears `confidence_z` against every other variant.
///
/// The comparison is a plain Welch-style statistic per pair with no
/// multiple-comparison correction. When both variances are zero the pair is
/// significant only if the best mean is strictly higher.
pub fn determine_winner(
    stats: &[VariantStats],
    min_samples: usize,
    confidence_z: f64,
) -> Option<String> {
    if stats.is_empty() || stats.iter().any(|entry| entry.samples < min_samples) {
        return None;
    }

    let mut best = &stats[0];
    for entry in &stats[1..] {
        if entry.mean > best.mean {
            best = entry;
        }
    }

    for other in stats {
        if std::ptr::eq(other, best) {
            continue;
        }

        let difference = best.mean - other.mean;
        let standard_error = (best.stdev.powi(2) / best.samples as f64
            + other.stdev.powi(2) / other.samples as f64)
            .sqrt();
        let statistic = if standard_error > 0.0 {
            difference / standard_error
        } else if difference > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        if statistic < confidence_z {
            return None;
        }
    }

    Some(best.variant.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curation::formatting::default_variants;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn stats(variant: &str, scores: &[f64]) -> VariantStats {
        VariantStats::from_scores(variant, scores)
    }

    fn repeated(pattern: &[f64], count: usize) -> Vec<f64> {
        pattern.iter().copied().cycle().take(count).collect()
    }

    #[test]
    fn winner_pins_selection() {
        let selector = VariantSelector::new(default_variants())
            .with_winner(Some("question_first".to_string()));
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let chosen = selector.select(&mut rng).expect("variant");
            assert_eq!(chosen.name, "question_first");
        }
    }

    #[test]
    fn unknown_winner_is_ignored() {
        let selector =
            VariantSelector::new(default_variants()).with_winner(Some("nope".to_string()));
        assert_eq!(selector.winner(), None);
    }

    #[test]
    fn seeded_selection_is_reproducible_and_covers_variants() {
        let selector = VariantSelector::new(default_variants());
        let draw = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..300)
                .map(|_| selector.select(&mut rng).expect("variant").name.clone())
                .collect::<Vec<_>>()
        };

        let first = draw(42);
        assert_eq!(first, draw(42));
        for variant in default_variants() {
            assert!(first.contains(&variant.name), "{} never drawn", variant.name);
        }
    }

    #[test]
    fn empty_selector_selects_nothing() {
        let selector = VariantSelector::new(Vec::new());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(selector.select(&mut rng).is_none());
    }

    #[test]
    fn stats_use_sample_standard_deviation() {
        let entry = stats("a", &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(entry.samples, 8);
        assert!((entry.mean - 5.0).abs() < 1e-9);
        assert!((entry.stdev - (32.0f64 / 7.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn no_winner_below_minimum_samples() {
        let strong = stats("a", &repeated(&[50.0, 52.0], 150));
        let weak = stats("b", &repeated(&[1.0, 2.0], 99));
        assert_eq!(determine_winner(&[strong, weak], 100, 1.96), None);
    }

    #[test]
    fn clear_leader_wins_with_enough_samples() {
        let strong = stats("a", &repeated(&[50.0, 52.0], 120));
        let weak = stats("b", &repeated(&[1.0, 2.0], 100));
        let middling = stats("c", &repeated(&[10.0, 12.0], 100));
        assert_eq!(
            determine_winner(&[weak, strong, middling], 100, 1.96),
            Some("a".to_string())
        );
    }

    #[test]
    fn one_insignificant_pair_blocks_the_win() {
        let best = stats("a", &repeated(&[10.0, 30.0], 100));
        let close = stats("b", &repeated(&[9.0, 30.0], 100));
        let weak = stats("c", &repeated(&[0.0, 1.0], 100));
        assert_eq!(determine_winner(&[best, close, weak], 100, 1.96), None);
    }

    #[test]
    fn zero_variance_ties_never_win() {
        let a = stats("a", &repeated(&[5.0], 100));
        let b = stats("b", &repeated(&[5.0], 100));
        assert_eq!(determine_winner(&[a, b], 100, 1.96), None);

        let a = stats("a", &repeated(&[6.0], 100));
        let b = stats("b", &repeated(&[5.0], 100));
        assert_eq!(determine_winner(&[a, b], 100, 1.96), Some("a".to_string()));
    }

    #[test]
    fn experiment_config_rejects_non_positive_z() {
        let config = ExperimentConfig {
            confidence_z: 0.0,
            ..ExperimentConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
