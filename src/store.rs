use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{LeagueCategory, Season};
use crate::experience::{ExperienceConfig, ExperienceEstimator};
use crate::ids::{LeagueId, TeamId};
use crate::roster::RosterGraph;

/// One row of the flattened all-teams table: a team's season line joined
/// with its league metadata. Written once at build time, read-only after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team_id: TeamId,
    pub team_name: String,
    pub league_id: LeagueId,
    pub season: Option<Season>,
    pub category: Option<LeagueCategory>,
    pub year: Option<i32>,
    pub division: String,
    pub base_rating: f64,
    pub avg_differential: f64,
    pub rating: f64,
}

/// The pipeline's output: the team/player maps, the per-team rating store,
/// and the flattened team table.
///
/// Invariant: every team id in the roster graph has a `TeamRecord`; the
/// reverse does not hold (a ledger team whose roster fetch failed is still
/// recorded).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingDatabase {
    pub league_teams: HashMap<LeagueId, Vec<TeamId>>,
    pub roster: RosterGraph,
    pub team_rating: HashMap<TeamId, f64>,
    pub teams: Vec<TeamRecord>,
}

impl RatingDatabase {
    /// Identity check for idempotent re-runs: a league that already has its
    /// team list recorded is never reprocessed.
    pub fn contains_league(&self, league: LeagueId) -> bool {
        self.league_teams.contains_key(&league)
    }

    pub fn record_for(&self, team: TeamId) -> Option<&TeamRecord> {
        self.teams.iter().find(|r| r.team_id == team)
    }

    pub fn league_of(&self, team: TeamId) -> Option<LeagueId> {
        self.league_teams
            .iter()
            .find(|(_, teams)| teams.contains(&team))
            .map(|(league, _)| *league)
    }

    pub fn estimator(&self, cfg: ExperienceConfig) -> ExperienceEstimator<'_> {
        ExperienceEstimator::new(&self.roster, &self.team_rating, cfg)
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn league_of_searches_the_team_lists() {
        let mut db = RatingDatabase::default();
        db.league_teams
            .insert(LeagueId(40100), vec![TeamId(1), TeamId(2)]);
        db.league_teams.insert(LeagueId(40200), vec![TeamId(3)]);
        assert_eq!(db.league_of(TeamId(3)), Some(LeagueId(40200)));
        assert_eq!(db.league_of(TeamId(9)), None);
    }
}
