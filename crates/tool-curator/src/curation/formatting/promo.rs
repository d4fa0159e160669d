use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::super::config::CurationConfigError;
use super::super::domain::CandidateTool;
use super::super::text::{truncate_chars, truncate_words};

const BASE_HASHTAGS: [&str; 2] = ["#AI", "#Tools"];
const MAX_HASHTAGS: usize = 5;

/// Where decisions are delivered; only the social channel carries promotional text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    #[default]
    Social,
    StaticSite,
}

/// Named phrasing of the promotional text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoVariant {
    pub name: String,
    pub template: String,
    #[serde(default)]
    pub description: String,
}

impl PromoVariant {
    fn new(name: &str, template: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            template: template.to_string(),
            description: description.to_string(),
        }
    }
}

pub fn default_variants() -> Vec<PromoVariant> {
    vec![
        PromoVariant::new(
            "emoji_first",
            "🔥 {name}\n\n{description}\n\nTry it here: {link}",
            "Emoji at start",
        ),
        PromoVariant::new(
            "question_first",
            "Want to supercharge your {category}?\n\n✨ {name}\n{description}\n\n{link}",
            "Starts with question",
        ),
        PromoVariant::new(
            "features_first",
            "Top features of {name}:\n\n▫️ {features}\n\nLearn more: {link}",
            "Features highlighted",
        ),
    ]
}

/// Coarse category used for hashtags and the `{category}` placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Email,
    Business,
    Productivity,
}

impl ToolCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            ToolCategory::Email => "email",
            ToolCategory::Business => "business",
            ToolCategory::Productivity => "productivity",
        }
    }

    const fn hashtags(self) -> [&'static str; 2] {
        match self {
            ToolCategory::Email => ["#EmailMarketing", "#Automation"],
            ToolCategory::Business => ["#Business", "#Entrepreneur"],
            ToolCategory::Productivity => ["#Productivity", "#Workflow"],
        }
    }
}

/// Classifies a tool from its name and description; productivity is the fallback.
pub fn classify(tool: &CandidateTool) -> ToolCategory {
    let text = tool.searchable_text();
    let mentions = |words: &[&str]| words.iter().any(|word| text.contains(word));

    if mentions(&["email", "newsletter", "marketing"]) {
        ToolCategory::Email
    } else if mentions(&["business", "sales", "revenue"]) {
        ToolCategory::Business
    } else {
        ToolCategory::Productivity
    }
}

/// Base tags followed by category tags, capped at `max` (never more than five).
pub fn hashtags(category: ToolCategory, max: usize) -> Vec<&'static str> {
    BASE_HASHTAGS
        .into_iter()
        .chain(category.hashtags())
        .take(max.min(MAX_HASHTAGS))
        .collect()
}

/// Promotional text settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionConfig {
    pub channel: DeliveryChannel,
    pub character_limit: usize,
    pub max_hashtags: usize,
    pub description_limit: usize,
    pub feature_limit: usize,
    pub variants: Vec<PromoVariant>,
    /// Concluded experiment winner; once set every decision uses it.
    pub winner: Option<String>,
}

impl PromotionConfig {
    pub(crate) fn validate(&self) -> Result<(), CurationConfigError> {
        for (field, limit) in [
            ("character_limit", self.character_limit),
            ("description_limit", self.description_limit),
            ("feature_limit", self.feature_limit),
        ] {
            if limit == 0 {
                return Err(CurationConfigError::ZeroLimit(field));
            }
        }
        if self.max_hashtags == 0 || self.max_hashtags > MAX_HASHTAGS {
            return Err(CurationConfigError::OutOfRange {
                field: "max_hashtags",
                value: self.max_hashtags as f64,
            });
        }
        if self.variants.is_empty() {
            return Err(CurationConfigError::NoVariants);
        }

        let mut seen = HashSet::new();
        for variant in &self.variants {
            if variant.name.trim().is_empty() || variant.template.trim().is_empty() {
                return Err(CurationConfigError::InvalidVariant(variant.name.clone()));
            }
            if !seen.insert(variant.name.as_str()) {
                return Err(CurationConfigError::DuplicateVariant(variant.name.clone()));
            }
        }

        if let Some(winner) = &self.winner {
            if !seen.contains(winner.as_str()) {
                return Err(CurationConfigError::UnknownWinner(winner.clone()));
            }
        }
        Ok(())
    }

    pub fn variant(&self, name: &str) -> Option<&PromoVariant> {
        self.variants.iter().find(|variant| variant.name == name)
    }
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            channel: DeliveryChannel::Social,
            character_limit: 280,
            max_hashtags: MAX_HASHTAGS,
            description_limit: 100,
            feature_limit: 3,
            variants: default_variants(),
            winner: None,
        }
    }
}

/// Composes the variant template with tool fields and hashtags, then applies
/// the platform character cap to the finished string.
pub fn build_promotional_text(
    tool: &CandidateTool,
    link: &str,
    variant: &PromoVariant,
    config: &PromotionConfig,
) -> String {
    let category = classify(tool);
    let description = truncate_words(tool.description.trim(), config.description_limit);
    let features = tool
        .features
        .iter()
        .map(|feature| feature.trim())
        .filter(|feature| !feature.is_empty())
        .take(config.feature_limit)
        .collect::<Vec<_>>()
        .join(", ");

    let body = render_template(
        &variant.template,
        &[
            ("name", tool.label()),
            ("description", description.as_str()),
            ("link", link),
            ("features", features.as_str()),
            ("category", category.as_str()),
        ],
    );
    let tags = hashtags(category, config.max_hashtags).join(" ");

    truncate_chars(&format!("{body}\n\n{tags}"), config.character_limit)
}

/// Single-pass `{key}` substitution; substituted values are never re-scanned
/// and unknown keys are left verbatim.
fn render_template(template: &str, fields: &[(&str, &str)]) -> String {
    let mut rendered = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match fields.iter().find(|(name, _)| *name == key) {
                    Some((_, value)) => rendered.push_str(value),
                    None => {
                        rendered.push('{');
                        rendered.push_str(key);
                        rendered.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                rendered.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    rendered.push_str(rest);
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(name: &str, description: &str) -> CandidateTool {
        CandidateTool::new(name, description, "https://tool.io")
            .with_features(["Drafting", "Scheduling", "Analytics", "Exports"])
    }

    #[test]
    fn classification_prefers_email_over_business() {
        assert_eq!(
            classify(&tool("MailPilot", "Newsletter tool that grows sales")),
            ToolCategory::Email
        );
        assert_eq!(
            classify(&tool("Ledger", "Revenue forecasting")),
            ToolCategory::Business
        );
        assert_eq!(
            classify(&tool("Notes", "Meeting summaries")),
            ToolCategory::Productivity
        );
    }

    #[test]
    fn zero_content_limits_are_rejected() {
        let config = PromotionConfig {
            description_limit: 0,
            ..PromotionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CurationConfigError::ZeroLimit("description_limit"))
        ));

        let config = PromotionConfig {
            feature_limit: 0,
            ..PromotionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CurationConfigError::ZeroLimit("feature_limit"))
        ));
        assert!(PromotionConfig::default().validate().is_ok());
    }

    #[test]
    fn hashtags_are_capped() {
        assert_eq!(
            hashtags(ToolCategory::Email, 5),
            vec!["#AI", "#Tools", "#EmailMarketing", "#Automation"]
        );
        assert_eq!(hashtags(ToolCategory::Business, 3).len(), 3);
        assert!(hashtags(ToolCategory::Productivity, 50).len() <= 5);
    }

    #[test]
    fn render_leaves_unknown_keys_and_does_not_rescan_values() {
        let rendered = render_template(
            "{name} -> {link} {unknown} {open",
            &[("name", "{link}"), ("link", "https://x.io")],
        );
        assert_eq!(rendered, "{link} -> https://x.io {unknown} {open");
    }

    #[test]
    fn features_variant_lists_first_three_features() {
        let config = PromotionConfig::default();
        let variant = config.variant("features_first").expect("variant").clone();
        let text = build_promotional_text(
            &tool("Planner", "Plans your day"),
            "https://tool.io",
            &variant,
            &config,
        );
        assert!(text.starts_with("Top features of Planner:"));
        assert!(text.contains("Drafting, Scheduling, Analytics"));
        assert!(!text.contains("Exports"));
        assert!(text.ends_with("#AI #Tools #Productivity #Workflow"));
    }

    #[test]
    fn long_text_is_cut_to_character_limit() {
        let config = PromotionConfig::default();
        let variant = config.variants[0].clone();
        let long_name = "N".repeat(400);
        let text = build_promotional_text(
            &tool(&long_name, "desc"),
            "https://tool.io",
            &variant,
            &config,
        );
        assert_eq!(text.chars().count(), 280);
    }

    #[test]
    fn validation_rejects_unknown_winner() {
        let config = PromotionConfig {
            winner: Some("missing".to_string()),
            ..PromotionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CurationConfigError::UnknownWinner(name)) if name == "missing"
        ));
    }

    #[test]
    fn validation_rejects_duplicate_variant_names() {
        let mut config = PromotionConfig::default();
        config.variants.push(config.variants[0].clone());
        assert!(matches!(
            config.validate(),
            Err(CurationConfigError::DuplicateVariant(_))
        ));
    }
}
