use serde::{Deserialize, Serialize};

use super::config::CurationConfigError;
use super::domain::{AffiliateProgram, CandidateTool};

/// Pattern class that produced a match, in evaluation precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    Domain,
    Name,
    Category,
}

/// Matcher outcome; `program` is absent when no configured rule applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub program: Option<AffiliateProgram>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<MatchRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl MatchResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_match(&self) -> bool {
        self.program.is_some()
    }

    pub fn program_name(&self) -> Option<&str> {
        self.program.as_ref().map(|program| program.name.as_str())
    }
}

/// First-match-wins matcher over the configured program order.
#[derive(Debug, Clone)]
pub struct ProgramMatcher {
    programs: Vec<AffiliateProgram>,
}

impl ProgramMatcher {
    /// Builds a matcher, lower-casing patterns and rejecting blank ones.
    pub fn new(programs: Vec<AffiliateProgram>) -> Result<Self, CurationConfigError> {
        let programs = programs
            .into_iter()
            .map(normalize_program)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { programs })
    }

    pub(crate) fn from_normalized(programs: Vec<AffiliateProgram>) -> Self {
        Self { programs }
    }

    pub fn programs(&self) -> &[AffiliateProgram] {
        &self.programs
    }

    pub fn match_tool(&self, tool: &CandidateTool) -> MatchResult {
        match_program(tool, &self.programs)
    }
}

/// Walks `programs` in order and returns the first whose domain, name, or
/// category patterns hit. Comparison ignores case on both sides. Later
/// programs and later classes are never consulted.
pub fn match_program(tool: &CandidateTool, programs: &[AffiliateProgram]) -> MatchResult {
    let url = tool.url.to_lowercase();
    let name = tool.name.to_lowercase();
    let text = tool.searchable_text();

    for program in programs {
        let classes = [
            (MatchRule::Domain, &program.domain_patterns, url.as_str()),
            (MatchRule::Name, &program.name_patterns, name.as_str()),
            (MatchRule::Category, &program.category_patterns, text.as_str()),
        ];

        for (rule, patterns, haystack) in classes {
            if let Some(pattern) = patterns
                .iter()
                .find(|pattern| haystack.contains(pattern.to_lowercase().as_str()))
            {
                return MatchResult {
                    program: Some(program.clone()),
                    rule: Some(rule),
                    pattern: Some(pattern.clone()),
                };
            }
        }
    }

    MatchResult::none()
}

fn normalize_program(
    mut program: AffiliateProgram,
) -> Result<AffiliateProgram, CurationConfigError> {
    program.name = program.name.trim().to_string();
    if program.name.is_empty() {
        return Err(CurationConfigError::InvalidProgram {
            program: program.name,
            reason: "program name is blank",
        });
    }
    if program.link_template.trim().is_empty() {
        return Err(CurationConfigError::InvalidProgram {
            program: program.name,
            reason: "link template is blank",
        });
    }

    for patterns in [
        &mut program.domain_patterns,
        &mut program.name_patterns,
        &mut program.category_patterns,
    ] {
        for pattern in patterns.iter_mut() {
            *pattern = pattern.trim().to_lowercase();
            if pattern.is_empty() {
                return Err(CurationConfigError::InvalidProgram {
                    program: program.name.clone(),
                    reason: "patterns must not be blank",
                });
            }
        }
    }

    Ok(program)
}

/// Programs shipped with the default settings.
pub fn default_programs() -> Vec<AffiliateProgram> {
    vec![
        AffiliateProgram {
            name: "GetResponse".to_string(),
            domain_patterns: vec!["getresponse.com".to_string()],
            name_patterns: vec!["getresponse".to_string()],
            category_patterns: vec![
                "email".to_string(),
                "marketing".to_string(),
                "automation".to_string(),
            ],
            link_template: "https://www.getresponse.com/?a={affiliateId}&c={url}".to_string(),
            affiliate_id: "DEFAULT_ID".to_string(),
        },
        AffiliateProgram {
            name: "Systeme".to_string(),
            domain_patterns: vec!["systeme.io".to_string()],
            name_patterns: vec!["systeme".to_string()],
            category_patterns: vec![
                "marketing".to_string(),
                "sales".to_string(),
                "funnel".to_string(),
            ],
            link_template: "https://systeme.io/{affiliateId}?via={url}".to_string(),
            affiliate_id: "DEFAULT_ID".to_string(),
        },
    ]
}
