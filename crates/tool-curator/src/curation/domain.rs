use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Label used when a discovered record arrives without a usable name.
pub const ANONYMOUS_LABEL: &str = "anonymous";

/// Discovered tool record awaiting quality evaluation.
///
/// Every field is defaulted on deserialization, and explicit `null`s count as
/// absent, so a sparse record degrades its score instead of failing to decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateTool {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub features: Vec<String>,
    pub category: Option<String>,
    pub pricing: Option<String>,
    pub documentation: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub api_available: bool,
    #[serde(alias = "added_date")]
    pub added_at: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl CandidateTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Name used in reports and logs, falling back to [`ANONYMOUS_LABEL`].
    pub fn label(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            ANONYMOUS_LABEL
        } else {
            trimmed
        }
    }

    /// Lower-cased `name description` text shared by keyword rules and matching.
    pub(crate) fn searchable_text(&self) -> String {
        format!("{} {}", self.name, self.description).to_lowercase()
    }
}

/// Fixed set of quality criteria computed for every tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityMetric {
    DescriptionQuality,
    NameQuality,
    UrlQuality,
    KeywordRelevance,
    FeatureCompleteness,
}

impl QualityMetric {
    pub const ALL: [QualityMetric; 5] = [
        QualityMetric::DescriptionQuality,
        QualityMetric::NameQuality,
        QualityMetric::UrlQuality,
        QualityMetric::KeywordRelevance,
        QualityMetric::FeatureCompleteness,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            QualityMetric::DescriptionQuality => "description_quality",
            QualityMetric::NameQuality => "name_quality",
            QualityMetric::UrlQuality => "url_quality",
            QualityMetric::KeywordRelevance => "keyword_relevance",
            QualityMetric::FeatureCompleteness => "feature_completeness",
        }
    }
}

impl fmt::Display for QualityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-metric scores, each clamped to `[0, 1]`.
pub type MetricScores = BTreeMap<QualityMetric, f64>;

/// Configured promotional partner with matching rules and a link template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateProgram {
    pub name: String,
    #[serde(default, alias = "domains")]
    pub domain_patterns: Vec<String>,
    #[serde(default, alias = "tool_names")]
    pub name_patterns: Vec<String>,
    #[serde(default, alias = "categories")]
    pub category_patterns: Vec<String>,
    pub link_template: String,
    pub affiliate_id: String,
}

/// Likes, reposts, and replies gathered for a published post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    #[serde(default)]
    pub likes: u32,
    #[serde(default, alias = "reposts")]
    pub retweets: u32,
    #[serde(default)]
    pub replies: u32,
}

impl EngagementMetrics {
    /// Weighted engagement: replies count triple and reposts double.
    pub fn score(&self) -> f64 {
        f64::from(self.likes) + f64::from(self.retweets) * 2.0 + f64::from(self.replies) * 3.0
    }
}

/// Converts a name into a URL-friendly identifier (`"Hello World!"` → `"hello-world"`).
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_falls_back_for_blank_names() {
        let tool = CandidateTool::new("   ", "desc", "https://x.io");
        assert_eq!(tool.label(), ANONYMOUS_LABEL);
        let tool = CandidateTool::new(" Claude ", "desc", "https://x.io");
        assert_eq!(tool.label(), "Claude");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Hello World!"), "hello-world");
        assert_eq!(slugify("  DALL-E 3 "), "dall-e-3");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn sparse_json_decodes_with_defaults() {
        let tool: CandidateTool =
            serde_json::from_str(r#"{"url": "midjourney.com"}"#).expect("decodes");
        assert!(tool.name.is_empty());
        assert!(tool.features.is_empty());
        assert_eq!(tool.url, "midjourney.com");
    }

    #[test]
    fn null_fields_decode_as_absent() {
        let tool: CandidateTool = serde_json::from_str(
            r#"{"name": null, "description": null, "url": "claude.ai", "features": null, "api_available": null}"#,
        )
        .expect("decodes");
        assert_eq!(tool.label(), ANONYMOUS_LABEL);
        assert!(tool.description.is_empty());
        assert!(tool.features.is_empty());
        assert!(!tool.api_available);
    }

    #[test]
    fn engagement_score_weights_replies_and_reposts() {
        let metrics = EngagementMetrics {
            likes: 4,
            retweets: 2,
            replies: 1,
        };
        assert_eq!(metrics.score(), 11.0);
    }
}
