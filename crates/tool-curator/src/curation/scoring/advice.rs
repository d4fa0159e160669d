use super::super::domain::{CandidateTool, MetricScores, QualityMetric};

/// Advisory notes for metrics under the floor plus any malformed-input notes.
///
/// Notes are produced only when at least one metric sits below `floor`; the
/// malformed-input notes always coincide with a zeroed metric.
pub(crate) fn suggestions_for(
    tool: &CandidateTool,
    metrics: &MetricScores,
    floor: f64,
) -> Vec<String> {
    let mut notes = Vec::new();

    if tool.name.trim().is_empty() {
        notes.push("Record has no name; reported as anonymous".to_string());
    }
    if tool.url.trim().is_empty() {
        notes.push("Record has no URL; add the tool homepage".to_string());
    }

    for (metric, score) in metrics {
        if *score < floor {
            notes.push(advice(*metric).to_string());
        }
    }

    notes
}

fn advice(metric: QualityMetric) -> &'static str {
    match metric {
        QualityMetric::DescriptionQuality => "Improve description length and quality",
        QualityMetric::NameQuality => "Use a short, memorable tool name",
        QualityMetric::UrlQuality => "Link to a secure URL on a recognised domain",
        QualityMetric::KeywordRelevance => "Add more relevant AI/automation keywords",
        QualityMetric::FeatureCompleteness => "Add more feature details and documentation",
    }
}
