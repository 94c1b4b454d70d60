// src/resolve.rs
//! Entity resolver: extractor fragments -> canonical team / player stub.

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::model::PlayerStub;
use crate::teams::{self, Team};

fn re_leading_article() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)^the(?:\s+|$)").unwrap())
}

fn re_team_trailing_clause() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s+(?:for|in|on)\s+.*$").unwrap())
}

fn re_player_trailing_clause() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s+(?:has been|is|was|will be)(?:\s+.*)?$").unwrap())
}

fn re_headline_tag() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(?:breaking|report|sources?)\s*:\s*").unwrap())
}

/// Resolve a team fragment ("the Lakers in a three-team deal") to a team.
/// Unknown tokens are `None`, which means "team unknown".
pub fn resolve_team(fragment: &str) -> Option<Team> {
    let token = clean_team_token(fragment);
    if token.is_empty() {
        return None;
    }
    teams::lookup_alias(&token).or_else(|| leading_alias(&token))
}

/// Longest leading run of up to three words that is a known alias. Covers
/// fragments with the summary glued on ("lakers the deal sends him west").
fn leading_alias(token: &str) -> Option<Team> {
    let words: Vec<&str> = token.split(' ').collect();
    (1..=words.len().min(3))
        .rev()
        .find_map(|n| teams::lookup_alias(&words[..n].join(" ")))
}

pub(crate) fn clean_team_token(fragment: &str) -> String {
    let lower = fragment.trim().to_lowercase();

    // Only the first sentence/clause names the team.
    let first = lower
        .split(['.', ',', ';', ':', '!', '?', '(', '|'])
        .next()
        .unwrap_or_default();

    let s = re_leading_article().replace(first.trim(), "");
    let s = re_team_trailing_clause().replace(&s, "");
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Isolate the proper noun from a player fragment.
pub fn clean_player_name(fragment: &str) -> String {
    let s = re_headline_tag().replace(fragment.trim(), "");
    let s = re_leading_article().replace(&s, "");
    let s = re_player_trailing_clause().replace(&s, "");
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Player stub from a fragment; `None` when nothing name-like remains.
pub fn resolve_player(fragment: &str) -> Option<PlayerStub> {
    let name = clean_player_name(fragment);
    if name.is_empty() {
        return None;
    }
    Some(PlayerStub::from_name(&name))
}
