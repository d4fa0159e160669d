use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::gateway::{GatewayError, SocialGateway};
use crate::curation::{DecisionRecord, EngagementMetrics};
use crate::storage::{RecordStore, StoreError};

pub const DEFAULT_REPOST_COOLDOWN_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEntry {
    pub last_posted: DateTime<Utc>,
    pub post_id: String,
    pub content: String,
}

/// Most recent post per tool label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostHistory {
    #[serde(default)]
    pub entries: BTreeMap<String, PostEntry>,
}

impl PostHistory {
    pub fn last_posted(&self, label: &str) -> Option<DateTime<Utc>> {
        self.entries.get(label).map(|entry| entry.last_posted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PostOutcome {
    Posted {
        label: String,
        post_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        variant: Option<String>,
    },
    BelowThreshold {
        label: String,
    },
    NoContent {
        label: String,
    },
    RecentlyPosted {
        label: String,
        last_posted: DateTime<Utc>,
    },
    Failed {
        label: String,
        reason: String,
    },
}

impl PostOutcome {
    pub fn label(&self) -> &str {
        match self {
            PostOutcome::Posted { label, .. }
            | PostOutcome::BelowThreshold { label }
            | PostOutcome::NoContent { label }
            | PostOutcome::RecentlyPosted { label, .. }
            | PostOutcome::Failed { label, .. } => label,
        }
    }

    pub fn post_id(&self) -> Option<&str> {
        match self {
            PostOutcome::Posted { post_id, .. } => Some(post_id),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Posts promotional text for passing decisions, at most once per tool per
/// cooldown window.
pub struct PromotionPoster<S, G> {
    history: Arc<S>,
    gateway: Arc<G>,
    cooldown: Duration,
    writes: Mutex<()>,
}

impl<S, G> PromotionPoster<S, G>
where
    S: RecordStore<PostHistory>,
    G: SocialGateway,
{
    pub fn new(history: Arc<S>, gateway: Arc<G>) -> Self {
        Self {
            history,
            gateway,
            cooldown: Duration::days(DEFAULT_REPOST_COOLDOWN_DAYS),
            writes: Mutex::new(()),
        }
    }

    pub fn with_cooldown_days(mut self, days: i64) -> Self {
        self.cooldown = Duration::days(days);
        self
    }

    pub fn history(&self) -> Result<PostHistory, PublishError> {
        Ok(self.history.load()?)
    }

    pub fn publish(
        &self,
        record: &DecisionRecord,
        now: DateTime<Utc>,
    ) -> Result<PostOutcome, PublishError> {
        let label = record.label.clone();
        if !record.passed() {
            return Ok(PostOutcome::BelowThreshold { label });
        }
        let Some(text) = record.promotional_text.as_deref() else {
            return Ok(PostOutcome::NoContent { label });
        };

        let _guard = self
            .writes
            .lock()
            .map_err(|_| PublishError::Store(StoreError::Poisoned))?;
        let mut history = self.history.load()?;
        if let Some(last_posted) = history.last_posted(&label) {
            if now - last_posted < self.cooldown {
                info!(tool = %label, %last_posted, "skipping recently posted tool");
                return Ok(PostOutcome::RecentlyPosted { label, last_posted });
            }
        }

        let receipt = self.gateway.post(text)?;
        history.entries.insert(
            label.clone(),
            PostEntry {
                last_posted: now,
                post_id: receipt.post_id.clone(),
                content: text.to_string(),
            },
        );
        self.history.save(&history)?;
        info!(tool = %label, post_id = %receipt.post_id, "promotion posted");

        Ok(PostOutcome::Posted {
            label,
            post_id: receipt.post_id,
            variant: record.variant.clone(),
        })
    }

    /// Publishes every record; a failure is reported for that record only.
    pub fn publish_batch(
        &self,
        records: &[DecisionRecord],
        now: DateTime<Utc>,
    ) -> Vec<PostOutcome> {
        records
            .iter()
            .map(|record| {
                self.publish(record, now).unwrap_or_else(|error| {
                    warn!(tool = %record.label, %error, "promotion failed");
                    PostOutcome::Failed {
                        label: record.label.clone(),
                        reason: error.to_string(),
                    }
                })
            })
            .collect()
    }

    /// Engagement for a post; zeroed when the platform cannot be reached.
    pub fn engagement(&self, post_id: &str) -> EngagementMetrics {
        match self.gateway.engagement(post_id) {
            Ok(metrics) => metrics,
            Err(error) => {
                warn!(post_id, %error, "engagement lookup failed");
                EngagementMetrics::default()
            }
        }
    }
}
