use super::common::*;

use crate::curation::scoring::rule_for_tests;
use crate::curation::{
    CandidateTool, CurationConfig, CurationConfigError, CurationSettings, MetricWeights,
    QualityMetric, QualityScorer, ScoringConfig,
};

#[test]
fn strong_tool_scores_top_marks_without_suggestions() {
    let config = CurationConfig::default();
    let result = config.scorer().score(&strong_tool());

    for metric in QualityMetric::ALL {
        assert!(approx(result.metrics[&metric], 1.0), "{metric} not saturated");
    }
    assert!(approx(result.overall_score, 1.0));
    assert!(result.passed);
    assert!(result.suggestions.is_empty());
    assert!(result.summary().starts_with("passed"));
}

#[test]
fn empty_record_scores_zero_and_explains_itself() {
    let config = CurationConfig::default();
    let result = config.scorer().score(&CandidateTool::default());

    assert!(result.metrics.values().all(|score| *score == 0.0));
    assert_eq!(result.overall_score, 0.0);
    assert!(!result.passed);
    assert_eq!(result.suggestions.len(), 7);
    assert!(result.suggestions[0].contains("anonymous"));
    assert!(result.suggestions[1].contains("no URL"));
}

#[test]
fn weak_tool_fails_with_one_note_per_low_metric() {
    let config = CurationConfig::default();
    let result = config.scorer().score(&weak_tool());

    assert!(approx(result.overall_score, 0.3176));
    assert!(!result.passed);
    assert_eq!(result.suggestions.len(), QualityMetric::ALL.len());
    assert!(result
        .suggestions
        .iter()
        .any(|note| note == "Add more relevant AI/automation keywords"));
    assert!(result.summary().contains("below threshold"));
}

#[test]
fn chatgpt_passes_with_default_rubric() {
    let config = CurationConfig::default();
    let result = config.scorer().score(&chatgpt());

    assert!(approx(result.overall_score, 0.9));
    assert!(result.passed);
    let any_low = result.metrics.values().any(|score| *score < 0.7);
    assert_eq!(result.suggestions.is_empty(), !any_low);
}

#[test]
fn score_equal_to_threshold_passes() {
    let baseline = CurationConfig::default().scorer().score(&chatgpt());
    let config = configure(|settings| {
        settings.scoring.min_score_threshold = baseline.overall_score;
    });
    let result = config.scorer().score(&chatgpt());

    assert_eq!(result.overall_score, baseline.overall_score);
    assert!(result.passed);
}

#[test]
fn raising_threshold_flips_the_outcome() {
    let config = configure(|settings| settings.scoring.min_score_threshold = 0.95);
    let result = config.scorer().score(&chatgpt());
    assert!(approx(result.overall_score, 0.9));
    assert!(!result.passed);
}

#[test]
fn weights_decide_the_overall_score() {
    let weights = MetricWeights::new([
        (QualityMetric::DescriptionQuality, 0.0),
        (QualityMetric::NameQuality, 0.0),
        (QualityMetric::UrlQuality, 1.0),
        (QualityMetric::KeywordRelevance, 0.0),
        (QualityMetric::FeatureCompleteness, 0.0),
    ])
    .expect("valid weights");
    let scorer = QualityScorer::new(ScoringConfig {
        weights,
        ..ScoringConfig::default()
    })
    .expect("valid rubric");

    let result = scorer.score(&chatgpt());
    assert!(approx(result.overall_score, 0.8));
}

#[test]
fn rubric_validation_rejects_bad_weights_and_limits() {
    let mut settings = CurationSettings::default();
    settings.scoring.weights = MetricWeights::new([
        (QualityMetric::DescriptionQuality, 0.5),
        (QualityMetric::NameQuality, 0.5),
        (QualityMetric::UrlQuality, 0.0),
        (QualityMetric::KeywordRelevance, 0.0),
        (QualityMetric::FeatureCompleteness, 0.0),
    ])
    .expect("valid weights");
    settings.scoring.keyword_target = 0;
    assert!(matches!(
        CurationConfig::try_from(settings),
        Err(CurationConfigError::ZeroLimit("keyword_target"))
    ));

    let partial = MetricWeights::new([(QualityMetric::UrlQuality, 1.0)]);
    assert!(matches!(partial, Err(CurationConfigError::MissingWeight(_))));
}

#[test]
fn url_rule_penalises_plain_http_and_unknown_domains() {
    let rule = rule_for_tests(QualityMetric::UrlQuality);
    let config = ScoringConfig::default();

    assert!(approx(rule(&weak_tool(), &config), 0.62));
    assert!(approx(rule(&strong_tool(), &config), 1.0));
    assert!(approx(rule(&chatgpt(), &config), 0.8));
}

#[test]
fn description_rule_rewards_length_keywords_and_readability() {
    let rule = rule_for_tests(QualityMetric::DescriptionQuality);
    let config = ScoringConfig::default();

    assert!(approx(rule(&weak_tool(), &config), 0.332));
    assert!(approx(rule(&chatgpt(), &config), 1.0));
    assert_eq!(rule(&CandidateTool::default(), &config), 0.0);
}

#[test]
fn rescoring_is_deterministic() {
    let config = CurationConfig::default();
    let tool = chatgpt();
    assert_eq!(config.scorer().score(&tool), config.scorer().score(&tool));
}
