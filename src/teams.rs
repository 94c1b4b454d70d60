//! # Teams & aliases
//!
//! Static reference data for the 30 NBA franchises plus the alias table that
//! maps free-text team mentions (nicknames, cities, full names) to a canonical
//! abbreviation.
//!
//! - Reference data is immutable; callers get clones of [`Team`].
//! - Alias lookup is exact on an already-cleaned, lower-case token.
//!   Cleaning (articles, trailing clauses) lives in `resolve`.
//! - Ambiguous cities ("los angeles", "new york" for the Nets) are left out on
//!   purpose so they resolve to no team.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conference {
    Eastern,
    Western,
}

/// Canonical team record as sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub city: String,
    pub abbreviation: String,
    pub conference: Conference,
    pub division: String,
}

static TEAMS: Lazy<HashMap<&'static str, Team>> = Lazy::new(|| {
    use Conference::{Eastern, Western};

    let mut m = HashMap::new();
    for (abbr, name, city, conf, div) in [
        ("ATL", "Hawks", "Atlanta", Eastern, "Southeast"),
        ("BOS", "Celtics", "Boston", Eastern, "Atlantic"),
        ("BKN", "Nets", "Brooklyn", Eastern, "Atlantic"),
        ("CHA", "Hornets", "Charlotte", Eastern, "Southeast"),
        ("CHI", "Bulls", "Chicago", Eastern, "Central"),
        ("CLE", "Cavaliers", "Cleveland", Eastern, "Central"),
        ("DAL", "Mavericks", "Dallas", Western, "Southwest"),
        ("DEN", "Nuggets", "Denver", Western, "Northwest"),
        ("DET", "Pistons", "Detroit", Eastern, "Central"),
        ("GSW", "Warriors", "Golden State", Western, "Pacific"),
        ("HOU", "Rockets", "Houston", Western, "Southwest"),
        ("IND", "Pacers", "Indiana", Eastern, "Central"),
        ("LAC", "Clippers", "Los Angeles", Western, "Pacific"),
        ("LAL", "Lakers", "Los Angeles", Western, "Pacific"),
        ("MEM", "Grizzlies", "Memphis", Western, "Southwest"),
        ("MIA", "Heat", "Miami", Eastern, "Southeast"),
        ("MIL", "Bucks", "Milwaukee", Eastern, "Central"),
        ("MIN", "Timberwolves", "Minnesota", Western, "Northwest"),
        ("NOP", "Pelicans", "New Orleans", Western, "Southwest"),
        ("NYK", "Knicks", "New York", Eastern, "Atlantic"),
        ("OKC", "Thunder", "Oklahoma City", Western, "Northwest"),
        ("ORL", "Magic", "Orlando", Eastern, "Southeast"),
        ("PHI", "76ers", "Philadelphia", Eastern, "Atlantic"),
        ("PHX", "Suns", "Phoenix", Western, "Pacific"),
        ("POR", "Trail Blazers", "Portland", Western, "Northwest"),
        ("SAC", "Kings", "Sacramento", Western, "Pacific"),
        ("SAS", "Spurs", "San Antonio", Western, "Southwest"),
        ("TOR", "Raptors", "Toronto", Eastern, "Atlantic"),
        ("UTA", "Jazz", "Utah", Western, "Northwest"),
        ("WAS", "Wizards", "Washington", Eastern, "Southeast"),
    ] {
        m.insert(
            abbr,
            Team {
                id: abbr.to_ascii_lowercase(),
                name: name.to_string(),
                city: city.to_string(),
                abbreviation: abbr.to_string(),
                conference: conf,
                division: div.to_string(),
            },
        );
    }
    m
});

static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for (alias, abbr) in [
        ("hawks", "ATL"),
        ("atlanta", "ATL"),
        ("atlanta hawks", "ATL"),
        ("celtics", "BOS"),
        ("boston", "BOS"),
        ("boston celtics", "BOS"),
        ("nets", "BKN"),
        ("brooklyn", "BKN"),
        ("brooklyn nets", "BKN"),
        ("hornets", "CHA"),
        ("charlotte", "CHA"),
        ("charlotte hornets", "CHA"),
        ("bulls", "CHI"),
        ("chicago", "CHI"),
        ("chicago bulls", "CHI"),
        ("cavaliers", "CLE"),
        ("cavs", "CLE"),
        ("cleveland", "CLE"),
        ("cleveland cavaliers", "CLE"),
        ("mavericks", "DAL"),
        ("mavs", "DAL"),
        ("dallas", "DAL"),
        ("dallas mavericks", "DAL"),
        ("nuggets", "DEN"),
        ("denver", "DEN"),
        ("denver nuggets", "DEN"),
        ("pistons", "DET"),
        ("detroit", "DET"),
        ("detroit pistons", "DET"),
        ("warriors", "GSW"),
        ("golden state", "GSW"),
        ("golden state warriors", "GSW"),
        ("rockets", "HOU"),
        ("houston", "HOU"),
        ("houston rockets", "HOU"),
        ("pacers", "IND"),
        ("indiana", "IND"),
        ("indiana pacers", "IND"),
        ("clippers", "LAC"),
        ("la clippers", "LAC"),
        ("los angeles clippers", "LAC"),
        ("lakers", "LAL"),
        ("los angeles lakers", "LAL"),
        ("grizzlies", "MEM"),
        ("memphis", "MEM"),
        ("memphis grizzlies", "MEM"),
        ("heat", "MIA"),
        ("miami", "MIA"),
        ("miami heat", "MIA"),
        ("bucks", "MIL"),
        ("milwaukee", "MIL"),
        ("milwaukee bucks", "MIL"),
        ("timberwolves", "MIN"),
        ("wolves", "MIN"),
        ("minnesota", "MIN"),
        ("minnesota timberwolves", "MIN"),
        ("pelicans", "NOP"),
        ("new orleans", "NOP"),
        ("new orleans pelicans", "NOP"),
        ("knicks", "NYK"),
        ("new york knicks", "NYK"),
        ("thunder", "OKC"),
        ("oklahoma city", "OKC"),
        ("oklahoma city thunder", "OKC"),
        ("magic", "ORL"),
        ("orlando", "ORL"),
        ("orlando magic", "ORL"),
        ("sixers", "PHI"),
        ("76ers", "PHI"),
        ("philadelphia", "PHI"),
        ("philadelphia 76ers", "PHI"),
        ("suns", "PHX"),
        ("phoenix", "PHX"),
        ("phoenix suns", "PHX"),
        ("trail blazers", "POR"),
        ("blazers", "POR"),
        ("portland", "POR"),
        ("portland trail blazers", "POR"),
        ("kings", "SAC"),
        ("sacramento", "SAC"),
        ("sacramento kings", "SAC"),
        ("spurs", "SAS"),
        ("san antonio", "SAS"),
        ("san antonio spurs", "SAS"),
        ("raptors", "TOR"),
        ("toronto", "TOR"),
        ("toronto raptors", "TOR"),
        ("jazz", "UTA"),
        ("utah", "UTA"),
        ("utah jazz", "UTA"),
        ("wizards", "WAS"),
        ("washington", "WAS"),
        ("washington wizards", "WAS"),
    ] {
        m.insert(alias, abbr);
    }
    m
});

/// Look up a cleaned, lower-case alias. Unknown tokens yield `None`.
pub fn lookup_alias(token: &str) -> Option<Team> {
    ALIASES.get(token).and_then(|abbr| by_abbreviation(abbr))
}

/// Look up by canonical abbreviation (case-insensitive).
pub fn by_abbreviation(abbr: &str) -> Option<Team> {
    TEAMS.get(abbr.to_ascii_uppercase().as_str()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_alias_points_at_a_known_team() {
        for abbr in ALIASES.values() {
            assert!(by_abbreviation(abbr).is_some(), "dangling alias -> {abbr}");
        }
    }

    #[test]
    fn thirty_franchises() {
        assert_eq!(TEAMS.len(), 30);
    }

    #[test]
    fn nickname_and_city_resolve() {
        assert_eq!(lookup_alias("lakers").unwrap().abbreviation, "LAL");
        assert_eq!(lookup_alias("golden state").unwrap().abbreviation, "GSW");
        assert_eq!(lookup_alias("76ers").unwrap().conference, Conference::Eastern);
    }

    #[test]
    fn ambiguous_city_is_unknown() {
        assert!(lookup_alias("los angeles").is_none());
        assert!(lookup_alias("Lakers").is_none(), "lookup expects cleaned input");
    }
}
