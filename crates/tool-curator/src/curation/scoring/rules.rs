use super::super::domain::{CandidateTool, MetricScores, QualityMetric};
use super::super::formatting::link::host_of;
use super::super::text::{
    count_keyword_hits, is_plain_alphanumeric, saturating_ratio, TextFeatures,
};
use super::config::ScoringConfig;

const READABLE_WORD_LENGTH_MIN: f64 = 4.0;
const READABLE_WORD_LENGTH_MAX: f64 = 8.0;
const NAME_LENGTH_MIN: usize = 3;
const NAME_LENGTH_MAX: usize = 30;
const DESCRIPTIVE_FEATURE_LENGTH: usize = 8;

pub(crate) type MetricRule = fn(&CandidateTool, &ScoringConfig) -> f64;

/// Rule table keyed by metric; every entry is evaluated for every tool.
const METRIC_RULES: [(QualityMetric, MetricRule); 5] = [
    (QualityMetric::DescriptionQuality, description_quality),
    (QualityMetric::NameQuality, name_quality),
    (QualityMetric::UrlQuality, url_quality),
    (QualityMetric::KeywordRelevance, keyword_relevance),
    (QualityMetric::FeatureCompleteness, feature_completeness),
];

pub(crate) fn score_metrics(tool: &CandidateTool, config: &ScoringConfig) -> MetricScores {
    METRIC_RULES
        .iter()
        .map(|(metric, rule)| (*metric, clamp_unit(rule(tool, config))))
        .collect()
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn description_quality(tool: &CandidateTool, config: &ScoringConfig) -> f64 {
    let features = TextFeatures::extract(&tool.description, config.vocabulary.keywords());
    if features.is_empty() {
        return 0.0;
    }

    let length = saturating_ratio(features.char_count, config.min_description_length);
    let keywords = saturating_ratio(features.keyword_hits, config.keyword_target);
    let readability = if (READABLE_WORD_LENGTH_MIN..=READABLE_WORD_LENGTH_MAX)
        .contains(&features.average_word_length)
    {
        1.0
    } else {
        0.7
    };

    length * 0.4 + keywords * 0.3 + readability * 0.3
}

fn name_quality(tool: &CandidateTool, config: &ScoringConfig) -> f64 {
    let name = tool.name.trim();
    if name.is_empty() {
        return 0.0;
    }

    let length = if (NAME_LENGTH_MIN..=NAME_LENGTH_MAX).contains(&name.chars().count()) {
        1.0
    } else {
        0.5
    };
    let memorable = if is_plain_alphanumeric(name) { 1.0 } else { 0.7 };
    let lowered = name.to_lowercase();
    let relevant = config
        .vocabulary
        .name_terms
        .iter()
        .any(|term| lowered.contains(term.as_str()));

    length * 0.4 + memorable * 0.3 + if relevant { 0.3 } else { 0.0 }
}

fn url_quality(tool: &CandidateTool, config: &ScoringConfig) -> f64 {
    let url = tool.url.trim();
    if url.is_empty() {
        return 0.0;
    }

    let secure = if url.to_ascii_lowercase().starts_with("https://") {
        1.0
    } else {
        0.5
    };
    let trusted_domain = host_of(url)
        .map(|host| {
            config
                .vocabulary
                .trusted_tlds
                .iter()
                .any(|tld| host.ends_with(tld.as_str()))
        })
        .unwrap_or(false);
    let domain = if trusted_domain { 1.0 } else { 0.7 };

    secure * 0.4 + domain * 0.6
}

fn keyword_relevance(tool: &CandidateTool, config: &ScoringConfig) -> f64 {
    let hits = count_keyword_hits(&tool.searchable_text(), config.vocabulary.keywords());
    saturating_ratio(hits, config.keyword_target)
}

fn feature_completeness(tool: &CandidateTool, config: &ScoringConfig) -> f64 {
    let declared: Vec<&str> = tool
        .features
        .iter()
        .map(|feature| feature.trim())
        .filter(|feature| !feature.is_empty())
        .collect();

    let required = [
        !tool.name.trim().is_empty(),
        !tool.description.trim().is_empty(),
        !tool.url.trim().is_empty(),
        !declared.is_empty(),
    ];
    let optional = [
        has_text(tool.pricing.as_deref()),
        has_text(tool.documentation.as_deref()),
        tool.api_available,
    ];

    let depth = if declared.is_empty() {
        0.0
    } else {
        let descriptive = declared
            .iter()
            .filter(|feature| {
                feature.contains(char::is_whitespace)
                    || feature.chars().count() >= DESCRIPTIVE_FEATURE_LENGTH
            })
            .count();
        saturating_ratio(declared.len(), config.min_features) * 0.5
            + (descriptive as f64 / declared.len() as f64) * 0.5
    };

    fraction(&required) * 0.5 + fraction(&optional) * 0.2 + depth * 0.3
}

fn has_text(value: Option<&str>) -> bool {
    value.map(|text| !text.trim().is_empty()).unwrap_or(false)
}

fn fraction(flags: &[bool]) -> f64 {
    if flags.is_empty() {
        return 0.0;
    }
    flags.iter().filter(|flag| **flag).count() as f64 / flags.len() as f64
}

#[cfg(test)]
pub(crate) fn rule_for_tests(metric: QualityMetric) -> MetricRule {
    METRIC_RULES
        .iter()
        .find(|(candidate, _)| *candidate == metric)
        .map(|(_, rule)| *rule)
        .unwrap_or(description_quality)
}
