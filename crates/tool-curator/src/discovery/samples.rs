use crate::curation::CandidateTool;

fn sample(
    name: &str,
    description: &str,
    url: &str,
    category: &str,
    features: &[&str],
    pricing: &str,
) -> CandidateTool {
    CandidateTool {
        category: Some(category.to_string()),
        pricing: Some(pricing.to_string()),
        ..CandidateTool::new(name, description, url).with_features(features.iter().copied())
    }
}

/// Fixed discovery set used by the demo and offline runs.
pub fn sample_tools() -> Vec<CandidateTool> {
    vec![
        sample(
            "ChatGPT",
            "Advanced language model for conversation and text generation.",
            "https://chat.openai.com",
            "Language Models",
            &["Text Generation", "Conversation", "Code Assistance"],
            "Free/Premium",
        ),
        sample(
            "DALL-E 3",
            "State-of-the-art AI image generation model.",
            "https://openai.com/dall-e-3",
            "Image Generation",
            &["Image Generation", "Art Creation", "Design"],
            "Paid",
        ),
        sample(
            "Claude",
            "Advanced AI assistant for various tasks.",
            "https://anthropic.com/claude",
            "Language Models",
            &["Text Generation", "Analysis", "Research"],
            "Free/Premium",
        ),
        sample(
            "Midjourney",
            "AI-powered image generation through Discord.",
            "https://midjourney.com",
            "Image Generation",
            &["Image Generation", "Art Creation"],
            "Paid",
        ),
        sample(
            "GitHub Copilot",
            "AI pair programmer that helps write better code.",
            "https://github.com/features/copilot",
            "Development",
            &["Code Completion", "Documentation", "Problem Solving"],
            "Paid",
        ),
    ]
}
