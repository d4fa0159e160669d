//! Normalized signals derived from free text.

/// Signals extracted once from a block of text and shared by the scoring rules.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFeatures {
    pub char_count: usize,
    pub word_count: usize,
    pub average_word_length: f64,
    pub keyword_hits: usize,
}

impl TextFeatures {
    pub fn extract<'a, I>(text: &str, keywords: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let lowered = text.to_lowercase();
        let (word_count, letters) = text
            .split_whitespace()
            .fold((0usize, 0usize), |(words, letters), word| {
                (words + 1, letters + word.chars().count())
            });
        let average_word_length = if word_count == 0 {
            0.0
        } else {
            letters as f64 / word_count as f64
        };

        Self {
            char_count: text.chars().count(),
            word_count,
            average_word_length,
            keyword_hits: count_keyword_hits(&lowered, keywords),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }
}

/// Counts distinct keywords occurring as substrings of already lower-cased text.
pub fn count_keyword_hits<'a, I>(lowered: &str, keywords: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: Vec<&str> = Vec::new();
    for keyword in keywords {
        if keyword.is_empty() || seen.contains(&keyword) {
            continue;
        }
        if lowered.contains(keyword) {
            seen.push(keyword);
        }
    }
    seen.len()
}

/// True when every character is an ASCII letter, digit, or whitespace.
pub fn is_plain_alphanumeric(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
}

/// Saturating ratio in `[0, 1]`; a zero target saturates immediately.
pub fn saturating_ratio(value: usize, target: usize) -> f64 {
    if target == 0 {
        return 1.0;
    }
    (value as f64 / target as f64).min(1.0)
}

/// Keeps at most `limit` characters of `text`, cutting back to the last word
/// boundary, and appends `...` when anything was removed. The marker is not
/// counted against `limit`.
pub fn truncate_words(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let head: String = text.chars().take(limit).collect();
    let cut = match head.rfind(' ') {
        Some(index) if index > 0 => &head[..index],
        _ => head.as_str(),
    };
    format!("{}...", cut.trim_end())
}

/// Hard character cap that never splits a multi-byte character.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
