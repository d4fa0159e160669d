use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::curation::{DecisionRecord, MetricScores};
use crate::storage::{RecordStore, StoreError};

/// Published tool as it appears on the static site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub outbound_link: String,
    pub category: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub quality_score: f64,
    #[serde(default)]
    pub metrics: MetricScores,
    #[serde(default)]
    pub program: Option<String>,
    pub added_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyDigest {
    pub id: String,
    pub week: u32,
    pub year: i32,
    pub published_at: DateTime<Utc>,
    pub categories: Vec<String>,
    pub total_tools: usize,
    pub avg_quality: f64,
    pub top_category: Option<String>,
}

/// Persisted catalog document keyed by slug.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteCatalog {
    #[serde(default)]
    pub entries: BTreeMap<String, CatalogEntry>,
    #[serde(default)]
    pub digests: Vec<WeeklyDigest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_tools: usize,
    pub categories: usize,
    pub this_week: usize,
    pub avg_quality: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogUpdate {
    pub added: Vec<String>,
    pub refreshed: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Newest first.
    Added,
    /// Highest quality first.
    Score,
    /// Case-insensitive alphabetical.
    Name,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct CatalogPublisher<S> {
    store: Arc<S>,
    writes: Mutex<()>,
}

impl<S> CatalogPublisher<S>
where
    S: RecordStore<SiteCatalog>,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            writes: Mutex::new(()),
        }
    }

    /// Upserts passing decisions by slug. Existing entries keep their
    /// original `added_at`.
    pub fn update(
        &self,
        records: &[DecisionRecord],
        now: DateTime<Utc>,
    ) -> Result<CatalogUpdate, CatalogError> {
        let _guard = self.writes.lock().map_err(|_| StoreError::Poisoned)?;
        let mut catalog = self.store.load()?;
        let mut update = CatalogUpdate::default();

        for record in records.iter().filter(|record| record.passed()) {
            let added_at = match catalog.entries.get(&record.slug) {
                Some(existing) => {
                    update.refreshed.push(record.slug.clone());
                    existing.added_at
                }
                None => {
                    update.added.push(record.slug.clone());
                    record.tool.added_at.unwrap_or(now)
                }
            };
            catalog
                .entries
                .insert(record.slug.clone(), entry_from(record, added_at, now));
        }

        self.store.save(&catalog)?;
        info!(
            added = update.added.len(),
            refreshed = update.refreshed.len(),
            "catalog updated"
        );
        Ok(update)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Result<CatalogStats, CatalogError> {
        let catalog = self.store.load()?;
        let week_ago = now - Duration::days(7);
        let entries: Vec<&CatalogEntry> = catalog.entries.values().collect();

        Ok(CatalogStats {
            total_tools: entries.len(),
            categories: categories_of(&entries).len(),
            this_week: entries
                .iter()
                .filter(|entry| entry.added_at > week_ago)
                .count(),
            avg_quality: average_quality(&entries),
        })
    }

    /// Builds the digest for the ISO week containing `now` and appends it.
    pub fn weekly_digest(&self, now: DateTime<Utc>) -> Result<WeeklyDigest, CatalogError> {
        let _guard = self.writes.lock().map_err(|_| StoreError::Poisoned)?;
        let mut catalog = self.store.load()?;
        let entries: Vec<&CatalogEntry> = catalog.entries.values().collect();
        let iso = now.iso_week();

        let digest = WeeklyDigest {
            id: format!("{}-w{:02}", iso.year(), iso.week()),
            week: iso.week(),
            year: iso.year(),
            published_at: now,
            categories: categories_of(&entries).into_iter().collect(),
            total_tools: entries.len(),
            avg_quality: average_quality(&entries),
            top_category: top_category(&entries),
        };

        catalog.digests.push(digest.clone());
        self.store.save(&catalog)?;
        info!(digest = %digest.id, tools = digest.total_tools, "weekly digest recorded");
        Ok(digest)
    }

    pub fn entries_sorted(&self, key: SortKey) -> Result<Vec<CatalogEntry>, CatalogError> {
        let mut entries: Vec<CatalogEntry> = self.store.load()?.entries.into_values().collect();
        match key {
            SortKey::Added => entries.sort_by(|a, b| b.added_at.cmp(&a.added_at)),
            SortKey::Score => entries.sort_by(|a, b| {
                b.quality_score
                    .partial_cmp(&a.quality_score)
                    .unwrap_or(Ordering::Equal)
            }),
            SortKey::Name => entries.sort_by_key(|entry| entry.name.to_lowercase()),
        }
        Ok(entries)
    }
}

fn entry_from(
    record: &DecisionRecord,
    added_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> CatalogEntry {
    let category = record
        .tool
        .category
        .as_deref()
        .map(str::trim)
        .filter(|category| !category.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| record.category.as_str().to_string());

    CatalogEntry {
        slug: record.slug.clone(),
        name: record.label.clone(),
        description: record.tool.description.clone(),
        url: record.tool.url.clone(),
        outbound_link: record.outbound_link.clone(),
        category,
        features: record.tool.features.clone(),
        quality_score: record.score.overall_score,
        metrics: record.score.metrics.clone(),
        program: record.program_name().map(str::to_string),
        added_at,
        last_updated: now,
    }
}

fn categories_of(entries: &[&CatalogEntry]) -> BTreeSet<String> {
    entries.iter().map(|entry| entry.category.clone()).collect()
}

fn average_quality(entries: &[&CatalogEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    entries.iter().map(|entry| entry.quality_score).sum::<f64>() / entries.len() as f64
}

/// Most frequent category; ties go to the alphabetically first.
fn top_category(entries: &[&CatalogEntry]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.category.as_str()).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (category, count) in counts {
        if best.map_or(true, |(_, current)| count > current) {
            best = Some((category, count));
        }
    }
    best.map(|(category, _)| category.to_string())
}
