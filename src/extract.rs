// src/extract.rs
//! Pattern extractor: raw headline text -> (move type, player fragment, team fragment).
//!
//! Rules are evaluated top to bottom and the first hit wins. The order is part of
//! the contract: specific headlines ("BREAKING: ... traded") sit above generic
//! verbs ("signs with", "joins"), and the catch-all `TRADE:` sits last.
//!
//! Capture group 1 is always the player fragment, group 2 (when the rule has one)
//! the team fragment. Matching is case-insensitive. No hit is the normal outcome
//! for most news items and is not an error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::MoveType;

/// One entry of the ordered rule table.
pub struct Rule {
    pub name: &'static str,
    pub move_type: MoveType,
    pattern: Regex,
}

impl Rule {
    fn new(name: &'static str, move_type: MoveType, pattern: &str) -> Self {
        Self {
            name,
            move_type,
            pattern: Regex::new(&format!("(?i){pattern}")).expect("extractor rule regex"),
        }
    }
}

/// Result of a successful classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub rule: &'static str,
    pub move_type: MoveType,
    pub player_fragment: String,
    pub team_fragment: Option<String>,
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    use MoveType::*;
    vec![
        Rule::new(
            "breaking_traded",
            Trade,
            r"BREAKING:?\s*(.+?)\s+(?:has been\s+)?traded\s+(?:to\s+)?(.+)",
        ),
        Rule::new(
            "re_signs",
            Signing,
            r"(.+?)\s+(?:re-signs?|re-signed)\s+(?:with\s+)?(.+)",
        ),
        Rule::new(
            "signs_with",
            Signing,
            r"(.+?)\s+(?:signs?|signed)\s+(?:with\s+)?(.+?)(?:\s+for\b|\s+to\b|\s*$)",
        ),
        Rule::new(
            "agrees_to_deal",
            Signing,
            r"(.+?)\s+agrees?\s+to\s+(?:a\s+)?(?:.*?\s+)?(?:deal|contract)\s+with\s+(.+)",
        ),
        Rule::new(
            "finalizes_deal",
            Signing,
            r"(.+?)\s+(?:finalizes?|finalized)\s+(?:a\s+)?(?:deal|trade|contract)\s+(?:with\s+)?(.+)",
        ),
        Rule::new(
            "traded_to",
            Trade,
            r"(.+?)\s+traded\s+(?:to\s+)?(.+?)(?:\s+for\b|\s+in\b|\s*$)",
        ),
        Rule::new("joins", Signing, r"(.+?)\s+(?:joins|joining)\s+(.+)"),
        Rule::new("waived_by", Waiver, r"(.+?)\s+(?:waived|claimed off waivers)\s+by\s+(.+)"),
        Rule::new("released_by", Release, r"(.+?)\s+(?:released|cut)\s+by\s+(.+)"),
        Rule::new(
            "acquired_by",
            Trade,
            r"(.+?)\s+acquired\s+by\s+(.+?)(?:\s+from\b|\s+via\b|\s*$)",
        ),
        Rule::new(
            "drafted_by",
            Draft,
            r"(.+?)\s+(?:drafted|selected)\s+by\s+(.+?)(?:\s+with\b|\s+at\b|\s*$)",
        ),
        Rule::new(
            "player_option",
            Other,
            r"(.+?)\s+(?:exercises|declines|opts\s+into|opts\s+out\s+of)\s+(?:.*?\s+)?option\b",
        ),
        Rule::new("trade_tag", Trade, r"TRADE:?\s*(.+)"),
    ]
});

/// Rule names in evaluation order.
pub fn rule_order() -> Vec<&'static str> {
    RULES.iter().map(|r| r.name).collect()
}

/// Classify `text`. `None` means no rule matched.
pub fn extract(text: &str) -> Option<Extraction> {
    for rule in RULES.iter() {
        let Some(caps) = rule.pattern.captures(text) else {
            continue;
        };
        let Some(player) = caps.get(1) else {
            continue;
        };
        let team = caps
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());

        return Some(Extraction {
            rule: rule.name,
            move_type: rule.move_type,
            player_fragment: player.as_str().trim().to_string(),
            team_fragment: team,
        });
    }
    None
}

/// Title and summary joined the way the extractor expects them.
pub fn classification_text(title: &str, summary: Option<&str>) -> String {
    match summary.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => format!("{} {}", title.trim(), s),
        None => title.trim().to_string(),
    }
}
