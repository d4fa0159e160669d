//! A/B experiment bookkeeping for promotional variants.
//!
//! The tracker owns the feedback loop around [`determine_winner`]: it hands out
//! selectors, remembers which variant each post used, and concludes the
//! experiment once engagement results clear the configured thresholds.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::curation::{
    determine_winner, CurationConfig, EngagementMetrics, ExperimentConfig, PromoVariant,
    VariantSelector, VariantStats,
};
use crate::storage::{RecordStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentState {
    #[default]
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub name: String,
    pub variants: Vec<String>,
    pub state: ExperimentState,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub winner: Option<String>,
    /// Engagement scores per variant, in arrival order.
    #[serde(default)]
    pub results: BTreeMap<String, Vec<f64>>,
}

impl Experiment {
    fn new(name: &str, variants: &[PromoVariant], now: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            variants: variants.iter().map(|variant| variant.name.clone()).collect(),
            state: ExperimentState::Active,
            started_at: now,
            completed_at: None,
            winner: None,
            results: BTreeMap::new(),
        }
    }

    pub fn total_samples(&self) -> usize {
        self.results.values().map(Vec::len).sum()
    }

    /// Stats for every declared variant, including ones with no samples yet.
    pub fn variant_stats(&self) -> Vec<VariantStats> {
        self.variants
            .iter()
            .map(|variant| {
                let scores = self.results.get(variant).map(Vec::as_slice).unwrap_or(&[]);
                VariantStats::from_scores(variant.as_str(), scores)
            })
            .collect()
    }
}

/// Pending variant assignment awaiting its engagement result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub experiment: String,
    pub variant: String,
    pub tool: String,
    pub assigned_at: DateTime<Utc>,
}

/// Persisted experiment document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentLedger {
    #[serde(default)]
    pub experiments: BTreeMap<String, Experiment>,
    #[serde(default)]
    pub assignments: BTreeMap<String, Assignment>,
    #[serde(default)]
    pub next_assignment: u64,
}

/// Read model returned by status queries and after each recorded result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentStatus {
    pub name: String,
    pub state: ExperimentState,
    pub winner: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_samples: usize,
    pub pending_assignments: usize,
    pub variants: Vec<VariantStats>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    #[error("experiment '{0}' does not exist")]
    UnknownExperiment(String),
    #[error("variant '{variant}' is not part of experiment '{experiment}'")]
    UnknownVariant { experiment: String, variant: String },
    #[error("assignment '{0}' is unknown or already recorded")]
    UnknownAssignment(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Experiment service over a persisted ledger. Ledger mutations are
/// serialised through an internal lock.
pub struct ExperimentTracker<S> {
    store: Arc<S>,
    variants: Vec<PromoVariant>,
    config: ExperimentConfig,
    pinned: Option<String>,
    writes: Mutex<()>,
}

impl<S> ExperimentTracker<S>
where
    S: RecordStore<ExperimentLedger>,
{
    pub fn new(store: Arc<S>, variants: Vec<PromoVariant>, config: ExperimentConfig) -> Self {
        Self {
            store,
            variants,
            config,
            pinned: None,
            writes: Mutex::new(()),
        }
    }

    /// Winner applied to experiments that have not concluded on their own.
    pub fn with_pinned_winner(mut self, winner: Option<String>) -> Self {
        self.pinned = winner;
        self
    }

    fn write_guard(&self) -> Result<MutexGuard<'_, ()>, ExperimentError> {
        self.writes
            .lock()
            .map_err(|_| ExperimentError::Store(StoreError::Poisoned))
    }

    pub fn from_config(store: Arc<S>, config: &CurationConfig) -> Self {
        Self::new(
            store,
            config.promotion().variants.clone(),
            config.experiment().clone(),
        )
        .with_pinned_winner(config.promotion().winner.clone())
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Name used when callers do not pick an experiment explicitly.
    pub fn default_experiment(&self) -> &str {
        &self.config.name
    }

    /// Returns the selector for `name`, starting the experiment on first use.
    ///
    /// Variants no longer present in the configuration are dropped from the
    /// selector; a concluded winner pins every draw.
    pub fn selector(
        &self,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<VariantSelector, ExperimentError> {
        let _guard = self.write_guard()?;
        let mut ledger = self.store.load()?;
        let experiment = match ledger.experiments.get(name) {
            Some(existing) => existing.clone(),
            None => {
                let created = Experiment::new(name, &self.variants, now);
                ledger.experiments.insert(name.to_string(), created.clone());
                self.store.save(&ledger)?;
                info!(experiment = name, variants = created.variants.len(), "experiment started");
                created
            }
        };

        let variants = self
            .variants
            .iter()
            .filter(|variant| experiment.variants.contains(&variant.name))
            .cloned()
            .collect();
        let winner = experiment.winner.or_else(|| self.pinned.clone());
        Ok(VariantSelector::new(variants).with_winner(winner))
    }

    /// Records which variant a tool's post used and returns the assignment id.
    pub fn assign(
        &self,
        name: &str,
        tool: &str,
        variant: &str,
        now: DateTime<Utc>,
    ) -> Result<String, ExperimentError> {
        let _guard = self.write_guard()?;
        let mut ledger = self.store.load()?;
        let experiment = ledger
            .experiments
            .get(name)
            .ok_or_else(|| ExperimentError::UnknownExperiment(name.to_string()))?;
        if !experiment.variants.iter().any(|declared| declared == variant) {
            return Err(ExperimentError::UnknownVariant {
                experiment: name.to_string(),
                variant: variant.to_string(),
            });
        }

        ledger.next_assignment += 1;
        let id = format!("{name}-{:06}", ledger.next_assignment);
        ledger.assignments.insert(
            id.clone(),
            Assignment {
                id: id.clone(),
                experiment: name.to_string(),
                variant: variant.to_string(),
                tool: tool.to_string(),
                assigned_at: now,
            },
        );
        self.store.save(&ledger)?;
        debug!(assignment = %id, variant, tool, "variant assigned");
        Ok(id)
    }

    /// Consumes an assignment, appends its engagement score, and concludes
    /// the experiment when a winner emerges.
    pub fn record_result(
        &self,
        assignment_id: &str,
        metrics: EngagementMetrics,
        now: DateTime<Utc>,
    ) -> Result<ExperimentStatus, ExperimentError> {
        let _guard = self.write_guard()?;
        let mut ledger = self.store.load()?;
        let assignment = ledger
            .assignments
            .remove(assignment_id)
            .ok_or_else(|| ExperimentError::UnknownAssignment(assignment_id.to_string()))?;
        let experiment = ledger
            .experiments
            .get_mut(&assignment.experiment)
            .ok_or_else(|| ExperimentError::UnknownExperiment(assignment.experiment.clone()))?;

        experiment
            .results
            .entry(assignment.variant.clone())
            .or_default()
            .push(metrics.score());

        if experiment.state == ExperimentState::Active {
            let stats = experiment.variant_stats();
            if let Some(winner) =
                determine_winner(&stats, self.config.min_samples, self.config.confidence_z)
            {
                info!(experiment = %experiment.name, %winner, "experiment concluded");
                experiment.winner = Some(winner);
                experiment.state = ExperimentState::Completed;
                experiment.completed_at = Some(now);
            }
        }

        let name = assignment.experiment;
        self.store.save(&ledger)?;
        status_of(&ledger, &name)
    }

    pub fn status(&self, name: &str) -> Result<ExperimentStatus, ExperimentError> {
        let ledger = self.store.load()?;
        status_of(&ledger, name)
    }

    pub fn experiments(&self) -> Result<Vec<String>, ExperimentError> {
        Ok(self.store.load()?.experiments.into_keys().collect())
    }
}

fn status_of(ledger: &ExperimentLedger, name: &str) -> Result<ExperimentStatus, ExperimentError> {
    let experiment = ledger
        .experiments
        .get(name)
        .ok_or_else(|| ExperimentError::UnknownExperiment(name.to_string()))?;
    let pending_assignments = ledger
        .assignments
        .values()
        .filter(|assignment| assignment.experiment == name)
        .count();

    Ok(ExperimentStatus {
        name: experiment.name.clone(),
        state: experiment.state,
        winner: experiment.winner.clone(),
        started_at: experiment.started_at,
        completed_at: experiment.completed_at,
        total_samples: experiment.total_samples(),
        pending_assignments,
        variants: experiment.variant_stats(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("valid time")
    }

    fn tracker(min_samples: usize) -> ExperimentTracker<MemoryStore<ExperimentLedger>> {
        let config = CurationConfig::default();
        let experiment = ExperimentConfig {
            min_samples,
            ..config.experiment().clone()
        };
        ExperimentTracker::new(
            Arc::new(MemoryStore::default()),
            config.promotion().variants.clone(),
            experiment,
        )
    }

    fn engagement(likes: u32) -> EngagementMetrics {
        EngagementMetrics {
            likes,
            retweets: 0,
            replies: 0,
        }
    }

    #[test]
    fn selector_creates_experiment_once() {
        let tracker = tracker(100);
        let selector = tracker.selector("launch", now()).expect("selector");
        assert_eq!(selector.variants().len(), 3);
        assert!(selector.winner().is_none());

        tracker.selector("launch", now()).expect("selector again");
        assert_eq!(tracker.experiments().expect("list"), vec!["launch".to_string()]);
        assert_eq!(tracker.status("launch").expect("status").total_samples, 0);
    }

    #[test]
    fn unknown_variant_and_experiment_are_rejected() {
        let tracker = tracker(100);
        assert!(matches!(
            tracker.assign("missing", "Claude", "emoji_first", now()),
            Err(ExperimentError::UnknownExperiment(_))
        ));

        tracker.selector("launch", now()).expect("selector");
        assert!(matches!(
            tracker.assign("launch", "Claude", "shouting", now()),
            Err(ExperimentError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn assignments_are_consumed_by_results() {
        let tracker = tracker(100);
        tracker.selector("launch", now()).expect("selector");
        let id = tracker
            .assign("launch", "Claude", "emoji_first", now())
            .expect("assign");
        assert_eq!(tracker.status("launch").expect("status").pending_assignments, 1);

        let status = tracker
            .record_result(&id, engagement(4), now())
            .expect("record");
        assert_eq!(status.total_samples, 1);
        assert_eq!(status.pending_assignments, 0);
        assert!(matches!(
            tracker.record_result(&id, engagement(4), now()),
            Err(ExperimentError::UnknownAssignment(_))
        ));
    }

    #[test]
    fn winner_concludes_experiment_and_pins_selector() {
        let tracker = tracker(5);
        tracker.selector("launch", now()).expect("selector");

        let plan = [
            ("emoji_first", [40, 42]),
            ("question_first", [2, 3]),
            ("features_first", [1, 2]),
        ];
        let mut status = None;
        for (variant, likes) in plan {
            for round in 0..5 {
                let id = tracker
                    .assign("launch", "Claude", variant, now())
                    .expect("assign");
                status = Some(
                    tracker
                        .record_result(&id, engagement(likes[round % 2]), now())
                        .expect("record"),
                );
            }
        }

        let status = status.expect("recorded");
        assert_eq!(status.state, ExperimentState::Completed);
        assert_eq!(status.winner.as_deref(), Some("emoji_first"));
        assert_eq!(status.completed_at, Some(now()));

        let selector = tracker.selector("launch", now()).expect("selector");
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..10 {
            assert_eq!(selector.select(&mut rng).expect("variant").name, "emoji_first");
        }
    }

    #[test]
    fn no_winner_while_any_variant_is_short_of_samples() {
        let tracker = tracker(5);
        tracker.selector("launch", now()).expect("selector");
        for _ in 0..10 {
            let id = tracker
                .assign("launch", "Claude", "emoji_first", now())
                .expect("assign");
            tracker
                .record_result(&id, engagement(50), now())
                .expect("record");
        }

        let status = tracker.status("launch").expect("status");
        assert_eq!(status.state, ExperimentState::Active);
        assert!(status.winner.is_none());
        assert_eq!(status.variants.len(), 3);
    }
}
