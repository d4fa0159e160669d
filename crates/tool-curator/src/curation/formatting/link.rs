use url::Url;

use super::super::domain::AffiliateProgram;

pub const URL_PLACEHOLDER: &str = "{url}";
pub const AFFILIATE_ID_PLACEHOLDER: &str = "{affiliateId}";

/// Trims the URL and prepends `https://` when no http(s) scheme is present.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Outbound link for a tool: the program template with `{url}` and
/// `{affiliateId}` replaced literally, or the normalized URL when unmatched.
///
/// Substitution performs no URL-encoding, so a URL containing `&` or `#`
/// is spliced into the template as-is.
pub fn build_link(url: &str, program: Option<&AffiliateProgram>) -> String {
    let normalized = normalize_url(url);
    match program {
        Some(program) => program
            .link_template
            .replace(URL_PLACEHOLDER, &normalized)
            .replace(AFFILIATE_ID_PLACEHOLDER, &program.affiliate_id),
        None => normalized,
    }
}

/// Lower-cased host of a possibly scheme-less URL.
pub(crate) fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(&normalize_url(url)).ok()?;
    parsed.host_str().map(|host| host.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(template: &str) -> AffiliateProgram {
        AffiliateProgram {
            name: "Example".to_string(),
            domain_patterns: vec!["tool.com".to_string()],
            name_patterns: Vec::new(),
            category_patterns: Vec::new(),
            link_template: template.to_string(),
            affiliate_id: "XYZ".to_string(),
        }
    }

    #[test]
    fn unmatched_link_is_normalized_url() {
        assert_eq!(build_link("test.com", None), "https://test.com");
        assert_eq!(build_link("  http://plain.io  ", None), "http://plain.io");
    }

    #[test]
    fn template_substitutes_both_placeholders() {
        let program = program("https://example.com/?a={affiliateId}&c={url}");
        assert_eq!(
            build_link("https://tool.com", Some(&program)),
            "https://example.com/?a=XYZ&c=https://tool.com"
        );
    }

    #[test]
    fn substitution_does_not_encode_url() {
        let program = program("https://example.com/?c={url}&a={affiliateId}");
        assert_eq!(
            build_link("tool.com/?x=1&y=2", Some(&program)),
            "https://example.com/?c=https://tool.com/?x=1&y=2&a=XYZ"
        );
    }

    #[test]
    fn host_handles_missing_scheme() {
        assert_eq!(host_of("Chat.OpenAI.com/path").as_deref(), Some("chat.openai.com"));
        assert_eq!(host_of("https://ai-platform.io").as_deref(), Some("ai-platform.io"));
        assert_eq!(host_of("https://"), None);
    }
}
