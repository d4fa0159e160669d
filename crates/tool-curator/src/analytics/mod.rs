//! Post engagement, affiliate conversion, and revenue reporting.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::curation::{DecisionRecord, EngagementMetrics};
use crate::storage::{RecordStore, StoreError};

/// Program bucket for conversions on posts that carried no affiliate link.
pub const UNAFFILIATED: &str = "unaffiliated";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedPost {
    pub post_id: String,
    pub tool: String,
    #[serde(default)]
    pub program: Option<String>,
    pub quality_score: f64,
    pub posted_at: DateTime<Utc>,
    #[serde(default)]
    pub metrics: EngagementMetrics,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub post_id: String,
    pub tool: String,
    #[serde(default)]
    pub program: Option<String>,
    pub amount: f64,
    pub converted_at: DateTime<Utc>,
}

/// Persisted analytics document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsLedger {
    #[serde(default)]
    pub posts: BTreeMap<String, TrackedPost>,
    #[serde(default)]
    pub conversions: Vec<Conversion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    Neutral,
}

impl Trend {
    /// Compares the mean of the later half against the earlier half with a 5% band.
    pub fn of(values: &[f64]) -> Self {
        if values.len() < 2 {
            return Trend::Neutral;
        }

        let (first, second) = values.split_at(values.len() / 2);
        let (first, second) = (mean(first), mean(second));
        if second > first * 1.05 {
            Trend::Increasing
        } else if second < first * 0.95 {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_posts: usize,
    pub total_conversions: usize,
    pub conversion_rate: f64,
    pub average_engagement: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementStats {
    pub average_engagement: f64,
    pub engagement_rate: f64,
    /// Posting hour (`HH:00`, UTC) with the highest mean engagement.
    pub best_posting_hour: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub conversion_rate: f64,
    pub total_revenue: f64,
    pub average_conversion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityStats {
    pub average_quality: f64,
    pub quality_trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub summary: ReportSummary,
    pub engagement: EngagementStats,
    pub conversions: ConversionStats,
    pub quality: QualityStats,
    pub period_days: i64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueReport {
    pub total_revenue: f64,
    pub by_program: BTreeMap<String, f64>,
    pub by_tool: BTreeMap<String, f64>,
    pub conversion_count: usize,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("post '{0}' is not tracked")]
    UnknownPost(String),
    #[error("conversion amount must be a non-negative number, got {0}")]
    InvalidAmount(f64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct AnalyticsTracker<S> {
    store: Arc<S>,
    writes: Mutex<()>,
}

impl<S> AnalyticsTracker<S>
where
    S: RecordStore<AnalyticsLedger>,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            writes: Mutex::new(()),
        }
    }

    fn write_guard(&self) -> Result<MutexGuard<'_, ()>, AnalyticsError> {
        self.writes
            .lock()
            .map_err(|_| AnalyticsError::Store(StoreError::Poisoned))
    }

    /// Starts tracking a published post with zeroed engagement.
    pub fn track_post(
        &self,
        post_id: &str,
        record: &DecisionRecord,
        now: DateTime<Utc>,
    ) -> Result<TrackedPost, AnalyticsError> {
        let _guard = self.write_guard()?;
        let mut ledger = self.store.load()?;
        let post = TrackedPost {
            post_id: post_id.to_string(),
            tool: record.label.clone(),
            program: record.program_name().map(str::to_string),
            quality_score: record.score.overall_score,
            posted_at: now,
            metrics: EngagementMetrics::default(),
            last_updated: None,
        };
        ledger.posts.insert(post_id.to_string(), post.clone());
        self.store.save(&ledger)?;
        info!(post_id, tool = %post.tool, "tracking post");
        Ok(post)
    }

    pub fn update_metrics(
        &self,
        post_id: &str,
        metrics: EngagementMetrics,
        now: DateTime<Utc>,
    ) -> Result<(), AnalyticsError> {
        let _guard = self.write_guard()?;
        let mut ledger = self.store.load()?;
        let post = ledger
            .posts
            .get_mut(post_id)
            .ok_or_else(|| AnalyticsError::UnknownPost(post_id.to_string()))?;
        post.metrics = metrics;
        post.last_updated = Some(now);
        self.store.save(&ledger)?;
        Ok(())
    }

    /// Attributes a conversion to the tool and program of a tracked post.
    pub fn track_conversion(
        &self,
        post_id: &str,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<Conversion, AnalyticsError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(AnalyticsError::InvalidAmount(amount));
        }

        let _guard = self.write_guard()?;
        let mut ledger = self.store.load()?;
        let Some(post) = ledger.posts.get(post_id) else {
            warn!(post_id, "conversion for unknown post");
            return Err(AnalyticsError::UnknownPost(post_id.to_string()));
        };

        let conversion = Conversion {
            post_id: post_id.to_string(),
            tool: post.tool.clone(),
            program: post.program.clone(),
            amount,
            converted_at: now,
        };
        ledger.conversions.push(conversion.clone());
        self.store.save(&ledger)?;
        info!(post_id, tool = %conversion.tool, amount, "conversion tracked");
        Ok(conversion)
    }

    /// Report over posts and conversions newer than `days` before `now`.
    pub fn performance_report(
        &self,
        now: DateTime<Utc>,
        days: i64,
    ) -> Result<PerformanceReport, AnalyticsError> {
        let ledger = self.store.load()?;
        let cutoff = now - Duration::days(days);

        let mut posts: Vec<&TrackedPost> = ledger
            .posts
            .values()
            .filter(|post| post.posted_at > cutoff)
            .collect();
        posts.sort_by_key(|post| post.posted_at);
        let conversions: Vec<&Conversion> = ledger
            .conversions
            .iter()
            .filter(|conversion| conversion.converted_at > cutoff)
            .collect();

        let engagement = engagement_stats(&posts);
        let conversions = conversion_stats(&conversions, ledger.posts.len());
        let qualities: Vec<f64> = posts.iter().map(|post| post.quality_score).collect();
        let quality = QualityStats {
            average_quality: mean(&qualities),
            quality_trend: Trend::of(&qualities),
        };

        Ok(PerformanceReport {
            summary: ReportSummary {
                total_posts: posts.len(),
                total_conversions: conversions.count,
                conversion_rate: conversions.stats.conversion_rate,
                average_engagement: engagement.average_engagement,
                revenue: conversions.stats.total_revenue,
            },
            engagement,
            conversions: conversions.stats,
            quality,
            period_days: days,
            generated_at: now,
        })
    }

    /// Lifetime revenue totals by program and by tool.
    pub fn revenue_report(&self, now: DateTime<Utc>) -> Result<RevenueReport, AnalyticsError> {
        let ledger = self.store.load()?;
        let mut by_program = BTreeMap::new();
        let mut by_tool = BTreeMap::new();

        for conversion in &ledger.conversions {
            let program = conversion.program.as_deref().unwrap_or(UNAFFILIATED);
            *by_program.entry(program.to_string()).or_insert(0.0) += conversion.amount;
            *by_tool.entry(conversion.tool.clone()).or_insert(0.0) += conversion.amount;
        }

        Ok(RevenueReport {
            total_revenue: ledger.conversions.iter().map(|c| c.amount).sum(),
            by_program,
            by_tool,
            conversion_count: ledger.conversions.len(),
            period_start: ledger.conversions.iter().map(|c| c.converted_at).min(),
            period_end: now,
        })
    }
}

struct ConversionSummary {
    count: usize,
    stats: ConversionStats,
}

fn engagement_stats(posts: &[&TrackedPost]) -> EngagementStats {
    if posts.is_empty() {
        return EngagementStats {
            average_engagement: 0.0,
            engagement_rate: 0.0,
            best_posting_hour: None,
        };
    }

    let scores: Vec<f64> = posts.iter().map(|post| post.metrics.score()).collect();
    let average = mean(&scores);

    let mut by_hour: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for (post, score) in posts.iter().zip(&scores) {
        by_hour.entry(post.posted_at.hour()).or_default().push(*score);
    }
    let mut best: Option<(u32, f64)> = None;
    for (hour, values) in &by_hour {
        let hour_mean = mean(values);
        if best.map_or(true, |(_, current)| hour_mean > current) {
            best = Some((*hour, hour_mean));
        }
    }

    EngagementStats {
        average_engagement: average,
        engagement_rate: average / posts.len() as f64,
        best_posting_hour: best.map(|(hour, _)| format!("{hour:02}:00")),
    }
}

fn conversion_stats(conversions: &[&Conversion], all_posts: usize) -> ConversionSummary {
    let total_revenue: f64 = conversions.iter().map(|conversion| conversion.amount).sum();
    let count = conversions.len();
    let stats = if count == 0 {
        ConversionStats {
            conversion_rate: 0.0,
            total_revenue: 0.0,
            average_conversion: 0.0,
        }
    } else {
        ConversionStats {
            conversion_rate: if all_posts == 0 {
                0.0
            } else {
                count as f64 / all_posts as f64
            },
            total_revenue,
            average_conversion: total_revenue / count as f64,
        }
    };
    ConversionSummary { count, stats }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
