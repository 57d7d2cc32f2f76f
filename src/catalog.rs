use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::LeagueId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeagueCategory {
    /// Players are drafted onto fresh teams each season.
    Hat,
    /// Teams persist with consistent rosters across seasons.
    Club,
}

impl Season {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "Spring" => Some(Season::Spring),
            "Summer" => Some(Season::Summer),
            "Fall" => Some(Season::Fall),
            "Winter" => Some(Season::Winter),
            _ => None,
        }
    }
}

impl LeagueCategory {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "Hat" => Some(LeagueCategory::Hat),
            "Club" => Some(LeagueCategory::Club),
            _ => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        };
        f.write_str(label)
    }
}

impl fmt::Display for LeagueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LeagueCategory::Hat => "Hat",
            LeagueCategory::Club => "Club",
        };
        f.write_str(label)
    }
}

/// Normalized metadata for one league, parsed once from its raw site name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    pub season: Option<Season>,
    pub category: Option<LeagueCategory>,
    pub year: Option<i32>,
}

impl League {
    /// Parse a raw league name like "Summer Club League 2015" by fixed
    /// positional tokenization: first token season, second token category,
    /// last token year. Deviating formats leave fields unset rather than
    /// failing; downstream consumers tolerate missing metadata.
    pub fn from_raw_name(id: LeagueId, name: &str) -> Self {
        let tokens: Vec<&str> = name.split_whitespace().collect();
        let season = tokens.first().and_then(|t| Season::parse(t));
        let mut category = tokens.get(1).and_then(|t| LeagueCategory::parse(t));
        let year = tokens.last().and_then(|t| t.parse::<i32>().ok());

        // Winter leagues are always drafted, whatever the name claims.
        if season == Some(Season::Winter) {
            category = Some(LeagueCategory::Hat);
        }

        Self {
            id,
            name: name.trim().to_string(),
            season,
            category,
            year,
        }
    }

    /// Key into the division rating tables, e.g. "Summer Club". None when
    /// either half failed to parse.
    pub fn rating_key(&self) -> Option<String> {
        match (self.season, self.category) {
            (Some(season), Some(category)) => Some(format!("{season} {category}")),
            _ => None,
        }
    }
}

/// All known leagues, in the order the upstream catalog listed them. That
/// order is the batch processing order.
#[derive(Debug, Clone, Default)]
pub struct LeagueCatalog {
    order: Vec<LeagueId>,
    by_id: HashMap<LeagueId, League>,
}

impl LeagueCatalog {
    pub fn from_raw(entries: &[(LeagueId, String)]) -> Self {
        let mut catalog = Self::default();
        for (id, name) in entries {
            catalog.insert(League::from_raw_name(*id, name));
        }
        catalog
    }

    pub fn insert(&mut self, league: League) {
        if !self.by_id.contains_key(&league.id) {
            self.order.push(league.id);
        }
        self.by_id.insert(league.id, league);
    }

    pub fn lookup(&self, id: LeagueId) -> Option<&League> {
        self.by_id.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &League> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_season_category_year() {
        let league = League::from_raw_name(LeagueId(40264), "Summer Club League 2016");
        assert_eq!(league.season, Some(Season::Summer));
        assert_eq!(league.category, Some(LeagueCategory::Club));
        assert_eq!(league.year, Some(2016));
        assert_eq!(league.rating_key().as_deref(), Some("Summer Club"));
    }

    #[test]
    fn winter_forces_hat() {
        let league = League::from_raw_name(LeagueId(7), "Winter Club League 2012");
        assert_eq!(league.category, Some(LeagueCategory::Hat));
        assert_eq!(league.rating_key().as_deref(), Some("Winter Hat"));
    }

    #[test]
    fn garbled_name_parses_to_none_not_error() {
        let league = League::from_raw_name(LeagueId(3), "Corporate Invitational");
        assert_eq!(league.season, None);
        assert_eq!(league.category, None);
        assert_eq!(league.year, None);
        assert_eq!(league.rating_key(), None);
    }

    #[test]
    fn catalog_iterates_in_insertion_order() {
        let catalog = LeagueCatalog::from_raw(&[
            (LeagueId(30), "Fall Club League 2014".to_string()),
            (LeagueId(10), "Spring Hat League 2013".to_string()),
        ]);
        let ids: Vec<LeagueId> = catalog.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![LeagueId(30), LeagueId(10)]);
        assert!(catalog.lookup(LeagueId(10)).is_some());
    }
}
