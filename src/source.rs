use std::collections::HashMap;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::http_cache::fetch_json_cached;
use crate::http_client::http_client;
use crate::ids::{LeagueId, TeamId};
use crate::ledger::ScheduleRow;

/// External data-fetch collaborator. The pipeline only sees plain text-cell
/// records; anything malformed or missing surfaces as an empty sequence or
/// an error, never a silent wrong value.
pub trait LeagueSource {
    /// (league id, raw league name), in catalog order.
    fn leagues(&self) -> Result<Vec<(LeagueId, String)>>;
    /// Flat schedule rows for one league, headers interleaved.
    fn schedule(&self, league: LeagueId) -> Result<Vec<ScheduleRow>>;
    /// (team id, team name) pairs for one league.
    fn teams(&self, league: LeagueId) -> Result<Vec<(TeamId, String)>>;
    /// Player names for one team.
    fn roster(&self, team: TeamId) -> Result<Vec<String>>;
}

/// In-memory source for tests and the synthetic demo feed. Unknown leagues
/// and teams yield empty sequences, which the pipeline reports as skips.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    leagues: Vec<(LeagueId, String)>,
    schedules: HashMap<LeagueId, Vec<ScheduleRow>>,
    teams: HashMap<LeagueId, Vec<(TeamId, String)>>,
    rosters: HashMap<TeamId, Vec<String>>,
}

impl StaticSource {
    pub fn add_league(&mut self, id: LeagueId, name: &str) -> &mut Self {
        self.leagues.push((id, name.to_string()));
        self
    }

    pub fn set_schedule(&mut self, league: LeagueId, rows: Vec<ScheduleRow>) -> &mut Self {
        self.schedules.insert(league, rows);
        self
    }

    pub fn add_team(&mut self, league: LeagueId, team: TeamId, name: &str) -> &mut Self {
        self.teams.entry(league).or_default().push((team, name.to_string()));
        self
    }

    pub fn set_roster<I, S>(&mut self, team: TeamId, players: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rosters.insert(
            team,
            players.into_iter().map(|p| p.as_ref().to_string()).collect(),
        );
        self
    }
}

impl LeagueSource for StaticSource {
    fn leagues(&self) -> Result<Vec<(LeagueId, String)>> {
        Ok(self.leagues.clone())
    }

    fn schedule(&self, league: LeagueId) -> Result<Vec<ScheduleRow>> {
        Ok(self.schedules.get(&league).cloned().unwrap_or_default())
    }

    fn teams(&self, league: LeagueId) -> Result<Vec<(TeamId, String)>> {
        Ok(self.teams.get(&league).cloned().unwrap_or_default())
    }

    fn roster(&self, team: TeamId) -> Result<Vec<String>> {
        Ok(self.rosters.get(&team).cloned().unwrap_or_default())
    }
}

/// JSON endpoints relative to a base URL, fetched through the conditional
/// GET cache. Bodies are arrays of text-cell rows, mirroring the flattened
/// tables the league site serves.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn fetch(&self, path: &str) -> Result<String> {
        let client = http_client()?;
        let url = format!("{}/{}", self.base_url, path);
        fetch_json_cached(client, &url).with_context(|| format!("fetch {url}"))
    }
}

impl LeagueSource for HttpSource {
    fn leagues(&self) -> Result<Vec<(LeagueId, String)>> {
        let body = self.fetch("leagues.json")?;
        parse_leagues_json(&body)
    }

    fn schedule(&self, league: LeagueId) -> Result<Vec<ScheduleRow>> {
        let body = self.fetch(&format!("leagues/{league}/schedule.json"))?;
        parse_schedule_json(&body)
    }

    fn teams(&self, league: LeagueId) -> Result<Vec<(TeamId, String)>> {
        let body = self.fetch(&format!("leagues/{league}/teams.json"))?;
        parse_teams_json(&body)
    }

    fn roster(&self, team: TeamId) -> Result<Vec<String>> {
        let body = self.fetch(&format!("teams/{team}/roster.json"))?;
        parse_roster_json(&body)
    }
}

/// Body: `[["40264", "Summer Club League 2016"], ...]`. `null` is empty.
pub fn parse_leagues_json(raw: &str) -> Result<Vec<(LeagueId, String)>> {
    let value: Value = serde_json::from_str(raw).context("invalid leagues json")?;
    let mut out = Vec::new();
    for row in value.as_array().into_iter().flatten() {
        let cells = row_cells(row);
        let (Some(id), Some(name)) = (cells.first(), cells.get(1)) else {
            continue;
        };
        let Ok(id) = id.parse::<LeagueId>() else {
            continue;
        };
        if !name.trim().is_empty() {
            out.push((id, name.trim().to_string()));
        }
    }
    Ok(out)
}

/// Body: `[["4/3 Div 1", "", ""], ["Red Fish", "9-3", "37"], ...]`.
/// A row with a blank record cell is a division header.
pub fn parse_schedule_json(raw: &str) -> Result<Vec<ScheduleRow>> {
    let value: Value = serde_json::from_str(raw).context("invalid schedule json")?;
    let mut out = Vec::new();
    for row in value.as_array().into_iter().flatten() {
        let cells = row_cells(row);
        let Some(team) = cells.first() else {
            continue;
        };
        if team.trim().is_empty() {
            continue;
        }
        let record = cells
            .get(1)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let plus_minus = cells.get(2).and_then(|c| c.trim().parse::<f64>().ok());
        out.push(ScheduleRow {
            team: team.trim().to_string(),
            record,
            plus_minus,
        });
    }
    Ok(out)
}

/// Body: `[["40291", "Red Fish"], ...]`.
pub fn parse_teams_json(raw: &str) -> Result<Vec<(TeamId, String)>> {
    let value: Value = serde_json::from_str(raw).context("invalid teams json")?;
    let mut out = Vec::new();
    for row in value.as_array().into_iter().flatten() {
        let cells = row_cells(row);
        let (Some(id), Some(name)) = (cells.first(), cells.get(1)) else {
            continue;
        };
        let Ok(id) = id.parse::<TeamId>() else {
            continue;
        };
        if !name.trim().is_empty() {
            out.push((id, name.trim().to_string()));
        }
    }
    Ok(out)
}

/// Body: `["Doe, Jane", "Roe, Richard", ...]`.
pub fn parse_roster_json(raw: &str) -> Result<Vec<String>> {
    let value: Value = serde_json::from_str(raw).context("invalid roster json")?;
    Ok(value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(cell_text)
        .filter(|name| !name.trim().is_empty())
        .map(|name| name.trim().to_string())
        .collect())
}

fn row_cells(row: &Value) -> Vec<String> {
    row.as_array()
        .into_iter()
        .flatten()
        .filter_map(cell_text)
        .collect()
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
