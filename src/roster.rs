use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::TeamId;

/// Bidirectional team/player association.
///
/// Player names are raw "Last, First[, nickname]" strings with whitespace
/// normalized; there is no identity resolution beyond that, so two spellings
/// of the same person are two players. A known accuracy limitation.
///
/// Per-player team lists are in append (scrape) order, not chronological
/// order. Anything treating a list as a timeline must go through
/// `player_history_sorted`, which orders by numeric team id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterGraph {
    team_players: HashMap<TeamId, Vec<String>>,
    player_teams: HashMap<String, Vec<TeamId>>,
}

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("duplicate team id {team}: roster already recorded")]
    DuplicateTeam { team: TeamId },
}

impl RosterGraph {
    /// Record a team's roster. A team id that is already present is a data
    /// integrity violation (ids are unique upstream); the insert is refused
    /// so the existing roster is never silently overwritten.
    pub fn insert_team<I, S>(&mut self, team: TeamId, players: I) -> Result<(), RosterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.team_players.contains_key(&team) {
            return Err(RosterError::DuplicateTeam { team });
        }

        let mut normalized = Vec::new();
        for player in players {
            let name = normalize_player_name(player.as_ref());
            if name.is_empty() {
                continue;
            }
            self.player_teams.entry(name.clone()).or_default().push(team);
            normalized.push(name);
        }
        self.team_players.insert(team, normalized);
        Ok(())
    }

    pub fn contains_team(&self, team: TeamId) -> bool {
        self.team_players.contains_key(&team)
    }

    pub fn team_players(&self, team: TeamId) -> Option<&[String]> {
        self.team_players.get(&team).map(Vec::as_slice)
    }

    /// Raw scrape-order history for a player.
    pub fn player_history(&self, player: &str) -> Option<&[TeamId]> {
        self.player_teams.get(player).map(Vec::as_slice)
    }

    /// Chronological history for a player: sorted by numeric team id, the
    /// global time proxy.
    pub fn player_history_sorted(&self, player: &str) -> Vec<TeamId> {
        let mut teams = self
            .player_teams
            .get(player)
            .cloned()
            .unwrap_or_default();
        teams.sort_unstable();
        teams
    }

    pub fn team_count(&self) -> usize {
        self.team_players.len()
    }

    pub fn player_count(&self) -> usize {
        self.player_teams.len()
    }

    pub fn teams(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.team_players.keys().copied()
    }

    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.player_teams.keys().map(String::as_str)
    }
}

/// Collapse runs of whitespace and trim. "  Doe,   Jane " becomes "Doe, Jane".
pub fn normalize_player_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a normalized "Last, First[, nickname]" name into lowercase
/// (first, last) for matching against the assessment table.
pub fn split_player_name(name: &str) -> Option<(String, String)> {
    let mut parts = name.splitn(3, ',');
    let last = parts.next()?.trim().to_lowercase();
    let first = parts.next()?.trim().to_lowercase();
    if last.is_empty() || first.is_empty() {
        return None;
    }
    Some((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_both_directions() {
        let mut graph = RosterGraph::default();
        graph
            .insert_team(TeamId(100), ["Doe, Jane", "Roe, Richard"])
            .unwrap();
        graph.insert_team(TeamId(200), ["Doe, Jane"]).unwrap();

        assert_eq!(graph.team_players(TeamId(100)).unwrap().len(), 2);
        assert_eq!(
            graph.player_history("Doe, Jane"),
            Some(&[TeamId(100), TeamId(200)][..])
        );
    }

    #[test]
    fn duplicate_team_is_refused_before_overwrite() {
        let mut graph = RosterGraph::default();
        graph.insert_team(TeamId(100), ["Doe, Jane"]).unwrap();
        let err = graph
            .insert_team(TeamId(100), ["Somebody, Else"])
            .unwrap_err();
        assert!(matches!(err, RosterError::DuplicateTeam { team } if team == TeamId(100)));
        // Original roster intact.
        assert_eq!(graph.team_players(TeamId(100)).unwrap(), ["Doe, Jane"]);
    }

    #[test]
    fn history_sorted_orders_by_team_id_not_append_order() {
        let mut graph = RosterGraph::default();
        graph.insert_team(TeamId(300), ["Doe, Jane"]).unwrap();
        graph.insert_team(TeamId(100), ["Doe, Jane"]).unwrap();
        assert_eq!(
            graph.player_history("Doe, Jane"),
            Some(&[TeamId(300), TeamId(100)][..])
        );
        assert_eq!(
            graph.player_history_sorted("Doe, Jane"),
            vec![TeamId(100), TeamId(300)]
        );
    }

    #[test]
    fn blank_and_messy_names_normalize() {
        let mut graph = RosterGraph::default();
        graph
            .insert_team(TeamId(1), ["  Doe,   Jane ", "", "   "])
            .unwrap();
        assert_eq!(graph.team_players(TeamId(1)).unwrap(), ["Doe, Jane"]);
    }

    #[test]
    fn split_name_lowercases() {
        assert_eq!(
            split_player_name("Doe, Jane"),
            Some(("jane".to_string(), "doe".to_string()))
        );
        assert_eq!(
            split_player_name("Doe, Jane, JJ"),
            Some(("jane".to_string(), "doe".to_string()))
        );
        assert_eq!(split_player_name("Cher"), None);
    }
}
