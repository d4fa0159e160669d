use super::common::*;

use crate::curation::{
    build_link, default_programs, match_program, AffiliateProgram, CandidateTool,
    CurationConfig, CurationConfigError, MatchRule, ProgramMatcher,
};

fn systeme_tool() -> CandidateTool {
    CandidateTool::new(
        "Pagecraft",
        "Course hosting with checkout pages.",
        "https://systeme.io/pagecraft",
    )
}

#[test]
fn category_keywords_match_first_program() {
    let config = CurationConfig::default();
    let result = config.matcher().match_tool(&strong_tool());

    assert_eq!(result.program_name(), Some("GetResponse"));
    assert_eq!(result.rule, Some(MatchRule::Category));
    assert_eq!(result.pattern.as_deref(), Some("email"));
}

#[test]
fn domain_rule_wins_over_name_rule() {
    let tool = CandidateTool::new("GetResponse", "Campaigns", "https://www.getresponse.com");
    let result = match_program(&tool, &default_programs());

    assert_eq!(result.rule, Some(MatchRule::Domain));
    assert_eq!(result.pattern.as_deref(), Some("getresponse.com"));
}

#[test]
fn earlier_program_wins_even_on_a_weaker_rule() {
    let mut tool = systeme_tool();
    tool.description = "Course hosting with email sequences.".to_string();
    let result = match_program(&tool, &default_programs());

    assert_eq!(result.program_name(), Some("GetResponse"));
    assert_eq!(result.rule, Some(MatchRule::Category));
}

#[test]
fn later_program_matches_when_earlier_ones_miss() {
    let result = match_program(&systeme_tool(), &default_programs());

    assert_eq!(result.program_name(), Some("Systeme"));
    assert_eq!(result.rule, Some(MatchRule::Domain));
}

#[test]
fn unrelated_tools_do_not_match() {
    let result = match_program(&weak_tool(), &default_programs());
    assert!(!result.is_match());
    assert!(result.rule.is_none());
    assert!(match_program(&strong_tool(), &[]).program.is_none());
}

#[test]
fn matched_link_substitutes_url_and_affiliate_id() {
    let config = CurationConfig::default();
    let tool = systeme_tool();
    let result = config.matcher().match_tool(&tool);

    let link = build_link(&tool.url, result.program.as_ref());
    assert_eq!(link, "https://systeme.io/DEFAULT_ID?via=https://systeme.io/pagecraft");
}

#[test]
fn matcher_lowercases_patterns_and_rejects_blank_ones() {
    let program = AffiliateProgram {
        name: " Beehiiv ".to_string(),
        domain_patterns: vec!["Beehiiv.COM".to_string()],
        name_patterns: Vec::new(),
        category_patterns: vec!["Newsletter".to_string()],
        link_template: "https://beehiiv.com/?via={affiliateId}".to_string(),
        affiliate_id: "ref-7".to_string(),
    };
    let matcher = ProgramMatcher::new(vec![program.clone()]).expect("valid program");
    assert_eq!(matcher.programs()[0].name, "Beehiiv");
    assert_eq!(matcher.programs()[0].domain_patterns, vec!["beehiiv.com"]);

    let tool = CandidateTool::new("Inbox Weekly", "Newsletter studio", "beehiiv.com/inbox");
    assert_eq!(matcher.match_tool(&tool).rule, Some(MatchRule::Domain));

    let mut blank = program;
    blank.category_patterns.push("   ".to_string());
    assert!(matches!(
        ProgramMatcher::new(vec![blank]),
        Err(CurationConfigError::InvalidProgram { .. })
    ));
}

#[test]
fn unnormalized_patterns_still_match_case_insensitively() {
    let program = AffiliateProgram {
        name: "GetResponse".to_string(),
        domain_patterns: vec!["GetResponse.com".to_string()],
        name_patterns: Vec::new(),
        category_patterns: Vec::new(),
        link_template: "{url}".to_string(),
        affiliate_id: "gr".to_string(),
    };
    let tool = CandidateTool::new("Campaigns", "Mail", "https://GETRESPONSE.com/app");
    let result = match_program(&tool, &[program]);

    assert_eq!(result.rule, Some(MatchRule::Domain));
    assert_eq!(result.pattern.as_deref(), Some("GetResponse.com"));
}
