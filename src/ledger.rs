use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Rating points granted per point of average score differential per game.
/// Calibration assumption: a team that wins by 5 a game sits about +300
/// rating points above its division's base.
pub const RATING_PER_GOAL_DIFF: f64 = 60.0;

#[derive(Debug, Clone, Copy)]
pub struct LedgerConfig {
    pub rating_per_goal_diff: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rating_per_goal_diff: RATING_PER_GOAL_DIFF,
        }
    }
}

/// One row of a league's flattened schedule table. Division headers carry a
/// division name in `team` and no record; every other row is a team result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub team: String,
    /// "wins-losses", e.g. "9-3". None on division header rows.
    pub record: Option<String>,
    /// Cumulative score differential over the season.
    pub plus_minus: Option<f64>,
}

impl ScheduleRow {
    pub fn header(division: &str) -> Self {
        Self {
            team: division.to_string(),
            record: None,
            plus_minus: None,
        }
    }

    pub fn result(team: &str, record: &str, plus_minus: f64) -> Self {
        Self {
            team: team.to_string(),
            record: Some(record.to_string()),
            plus_minus: Some(plus_minus),
        }
    }

    pub fn is_header(&self) -> bool {
        self.record.is_none()
    }
}

/// One team's season line after ledger construction: division assignment,
/// parsed record, per-game differential, and the adhoc scalar rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team_name: String,
    pub division: String,
    pub base_rating: f64,
    pub wins: u32,
    pub losses: u32,
    pub avg_differential: f64,
    pub rating: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("no division headers found in schedule")]
    NoDivisions,
    #[error("blank division header at row {row}")]
    BadDivisionHeader { row: usize },
    #[error("result row {row} precedes any division header")]
    OrphanRow { row: usize },
    #[error("no base rating for division {division:?}")]
    MissingDivisionRating { division: String },
}

/// Partition the flat schedule into per-division blocks and derive one
/// `TeamStanding` per result row. Header rows delimit blocks: every result
/// row between header[i] and header[i+1] belongs to division[i], and rows
/// after the last header belong to the last division.
///
/// Fails per league (for the caller to skip): schedules with no headers,
/// blank header names, and divisions absent from a hand-specified rating
/// table. Rows whose record parses to zero games, or whose differential cell
/// is missing, are dropped with a warning rather than scored wrong.
pub fn build_ledger(
    rows: &[ScheduleRow],
    division_ratings: &HashMap<String, f64>,
    cfg: LedgerConfig,
) -> Result<Vec<TeamStanding>, LedgerError> {
    if !rows.iter().any(ScheduleRow::is_header) {
        return Err(LedgerError::NoDivisions);
    }

    let mut ledger = Vec::new();
    let mut current_division: Option<(String, f64)> = None;

    for (idx, row) in rows.iter().enumerate() {
        if row.is_header() {
            let name = row.team.trim();
            if name.is_empty() {
                return Err(LedgerError::BadDivisionHeader { row: idx });
            }
            let base = *division_ratings.get(name).ok_or_else(|| {
                LedgerError::MissingDivisionRating {
                    division: name.to_string(),
                }
            })?;
            current_division = Some((name.to_string(), base));
            continue;
        }

        let Some((division, base_rating)) = current_division.clone() else {
            // Result rows before the first header have no division; the
            // schedule is malformed in a way the partition cannot repair.
            return Err(LedgerError::OrphanRow { row: idx });
        };

        let Some((wins, losses)) = row.record.as_deref().and_then(parse_record) else {
            warn!(team = %row.team, "unparseable record, dropping row");
            continue;
        };
        let games = wins + losses;
        if games == 0 {
            warn!(team = %row.team, "zero games played, dropping row");
            continue;
        }
        let Some(plus_minus) = row.plus_minus else {
            warn!(team = %row.team, "missing score differential, dropping row");
            continue;
        };
        let avg_differential = plus_minus / f64::from(games);

        ledger.push(TeamStanding {
            team_name: row.team.trim().to_string(),
            division,
            base_rating,
            wins,
            losses,
            avg_differential,
            rating: base_rating + cfg.rating_per_goal_diff * avg_differential,
        });
    }

    Ok(ledger)
}

/// Names of the divisions a schedule mentions, in first-seen order.
pub fn observed_divisions(rows: &[ScheduleRow]) -> Vec<String> {
    let mut seen = Vec::new();
    for row in rows {
        if row.is_header() {
            let name = row.team.trim();
            if !name.is_empty() && !seen.iter().any(|s| s == name) {
                seen.push(name.to_string());
            }
        }
    }
    seen
}

fn parse_record(record: &str) -> Option<(u32, u32)> {
    let (wins, losses) = record.trim().split_once('-')?;
    Some((wins.trim().parse().ok()?, losses.trim().parse().ok()?))
}
