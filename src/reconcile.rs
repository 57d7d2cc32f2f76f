use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::experience::ExperienceEstimator;
use crate::ids::{LeagueId, TeamId};
use crate::roster::split_player_name;

/// Self-assessment rank assumed when a row exists but its rank is the "nan"
/// sentinel: unrated means total newbie.
pub const UNRATED_SELF_RANK: f64 = 10.0;

/// Draft rank assumed for a player with no assessment row at all.
pub const DEFAULT_DRAFT_RANK: f64 = 50.0;

// Calibration control points between the bounded self scale (0-100) and the
// open-ended experience scale. Both curves are monotone; the inverse gets
// padded endpoints so extreme experience values still land inside [0, 100].
const SELF_POINTS: [f64; 12] = [
    -1.0, 0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0,
];
const EXPERIENCE_POINTS: [f64; 12] = [
    500.0, 500.0, 600.0, 800.0, 900.0, 1000.0, 1200.0, 1400.0, 1600.0, 1800.0, 2000.0, 2000.0,
];

const EXPERIENCE_INV_POINTS: [f64; 13] = [
    -500.0, 500.0, 600.0, 800.0, 900.0, 1000.0, 1200.0, 1400.0, 1600.0, 1800.0, 2000.0, 2100.0,
    2900.0,
];
const SELF_INV_POINTS: [f64; 13] = [
    0.0, 0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 100.0,
];

#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error("value {value} outside calibration domain [{min}, {max}]")]
    OutOfDomain { value: f64, min: f64, max: f64 },
}

/// Map a self-assessment rank onto the experience scale.
pub fn self_to_experience(self_rank: f64) -> Result<f64, CalibrationError> {
    piecewise_linear(&SELF_POINTS, &EXPERIENCE_POINTS, self_rank)
}

/// Map an experience rating back onto the self scale.
pub fn experience_to_self(experience: f64) -> Result<f64, CalibrationError> {
    piecewise_linear(&EXPERIENCE_INV_POINTS, &SELF_INV_POINTS, experience)
}

/// Clamp into the inverse curve's domain, then convert. For aggregate
/// displays where an extreme rating should saturate rather than error.
pub fn experience_to_self_clamped(experience: f64) -> f64 {
    let min = EXPERIENCE_INV_POINTS[0];
    let max = EXPERIENCE_INV_POINTS[EXPERIENCE_INV_POINTS.len() - 1];
    // Domain error is unreachable after the clamp.
    experience_to_self(experience.clamp(min, max)).unwrap_or(0.0)
}

/// Linear interpolation between bracketing control points. Inputs outside
/// the control-point domain are a domain error; callers clamp first or
/// accept it.
fn piecewise_linear(xs: &[f64], ys: &[f64], x: f64) -> Result<f64, CalibrationError> {
    debug_assert_eq!(xs.len(), ys.len());
    let (min, max) = (xs[0], xs[xs.len() - 1]);
    if x < min || x > max {
        return Err(CalibrationError::OutOfDomain { value: x, min, max });
    }
    for window in 0..xs.len() - 1 {
        let (x0, x1) = (xs[window], xs[window + 1]);
        if x >= x0 && x <= x1 {
            if x1 == x0 {
                continue;
            }
            let t = (x - x0) / (x1 - x0);
            return Ok(ys[window] + t * (ys[window + 1] - ys[window]));
        }
    }
    // Exact right endpoint after a zero-width final segment.
    Ok(ys[ys.len() - 1])
}

/// One row of the external self/captain assessment table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRow {
    pub league_id: LeagueId,
    pub first_name: String,
    pub last_name: String,
    pub rank_type: u32,
    /// Numeric self rank, or None when the upstream "nan" sentinel appeared.
    #[serde(deserialize_with = "rank_or_nan", default)]
    pub rank: Option<f64>,
    /// Same sentinel convention as `rank`: captains leave "nan" behind too.
    #[serde(deserialize_with = "rank_or_nan", default)]
    pub captain_rank: Option<f64>,
}

// The upstream export writes unrated ranks as the literal string "nan".
fn rank_or_nan<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        None,
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) if n.is_finite() => Some(n),
        Raw::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    })
}

/// Self/captain assessments indexed by (league, first, last), lowercase.
#[derive(Debug, Clone, Default)]
pub struct AssessmentTable {
    by_player: HashMap<(LeagueId, String, String), Vec<AssessmentRow>>,
}

impl AssessmentTable {
    pub fn from_rows(rows: Vec<AssessmentRow>) -> Self {
        let mut by_player: HashMap<(LeagueId, String, String), Vec<AssessmentRow>> =
            HashMap::new();
        for row in rows {
            let key = (
                row.league_id,
                row.first_name.trim().to_lowercase(),
                row.last_name.trim().to_lowercase(),
            );
            by_player.entry(key).or_default().push(row);
        }
        Self { by_player }
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let rows: Vec<AssessmentRow> = serde_json::from_str(raw)?;
        Ok(Self::from_rows(rows))
    }

    pub fn is_empty(&self) -> bool {
        self.by_player.is_empty()
    }

    fn rows_for(&self, league: LeagueId, first: &str, last: &str) -> Option<&[AssessmentRow]> {
        self.by_player
            .get(&(league, first.to_string(), last.to_string()))
            .map(Vec::as_slice)
    }

    /// Self-reported draft rank (rank_type 1). A matching row whose rank is
    /// the "nan" sentinel counts as unrated, not as missing.
    pub fn draft_rank(&self, league: LeagueId, first: &str, last: &str) -> Option<f64> {
        let rows = self.rows_for(league, first, last)?;
        rows.iter()
            .find(|r| r.rank_type == 1)
            .map(|r| r.rank.unwrap_or(UNRATED_SELF_RANK))
    }

    /// Captain-assigned rank, any rank type; first numeric value wins.
    pub fn captain_rank(&self, league: LeagueId, first: &str, last: &str) -> Option<f64> {
        let rows = self.rows_for(league, first, last)?;
        rows.iter().find_map(|r| r.captain_rank)
    }
}

#[derive(Debug, Clone)]
pub struct ReconciledPlayer {
    pub name: String,
    pub draft_rank: Option<f64>,
    pub captain_rank: Option<f64>,
    /// Derived self signal: 2 * draft - captain; draft defaults to 50 when
    /// no row exists, captain falls back to the draft rank.
    pub self_rank: Option<f64>,
    pub experience_rating: f64,
    pub from_history: bool,
    /// True when an actual assessment row supplied the substitute. False
    /// both for history players and for the default-draft substitution.
    pub overridden: bool,
}

#[derive(Debug, Clone)]
pub struct ReconciledTeam {
    pub team: TeamId,
    pub players: Vec<ReconciledPlayer>,
    /// Mean experience rating after reconciliation.
    pub experience_rating: f64,
    /// The same signal expressed on the self scale.
    pub self_scale_rating: f64,
}

/// Blends self/captain assessments into the experience estimates.
///
/// Players whose club history already produced a rating keep it untouched.
/// Players on the default floor get the assessment substitute instead: the
/// captain's rank where one exists, else the self-reported draft rank,
/// else the default draft rank of 50, converted through the calibration
/// curve.
pub struct Reconciler<'a> {
    assessments: &'a AssessmentTable,
}

impl<'a> Reconciler<'a> {
    pub fn new(assessments: &'a AssessmentTable) -> Self {
        Self { assessments }
    }

    pub fn reconcile_team(
        &self,
        estimator: &ExperienceEstimator<'_>,
        league: LeagueId,
        team: TeamId,
    ) -> Option<ReconciledTeam> {
        let prediction = estimator.predict_team(team)?;

        let mut players = Vec::with_capacity(prediction.players.len());
        for base in prediction.players {
            let looked_up = split_player_name(&base.name).map(|(first, last)| {
                (
                    self.assessments.draft_rank(league, &first, &last),
                    self.assessments.captain_rank(league, &first, &last),
                )
            });
            let (draft, captain) = looked_up.unwrap_or((None, None));

            let mut rating = base.rating;
            let mut overridden = false;
            if !base.from_history {
                // A player with no assessment row at all is assumed to be a
                // median draft pick. Ranks already live on the 0-100 scale;
                // the clamp keeps them inside the curve's domain.
                let rank = captain.or(draft).unwrap_or(DEFAULT_DRAFT_RANK);
                if let Ok(substitute) = self_to_experience(rank.clamp(0.0, 100.0)) {
                    rating = substitute;
                    overridden = captain.is_some() || draft.is_some();
                }
            }

            let draft_or_default = draft.unwrap_or(DEFAULT_DRAFT_RANK);
            let self_rank = match captain {
                Some(c) => Some(2.0 * draft_or_default - c),
                None => Some(draft_or_default),
            };

            players.push(ReconciledPlayer {
                name: base.name,
                draft_rank: draft,
                captain_rank: captain,
                self_rank,
                experience_rating: rating,
                from_history: base.from_history,
                overridden,
            });
        }

        let experience_rating = if players.is_empty() {
            estimator.config().default_rating
        } else {
            players.iter().map(|p| p.experience_rating).sum::<f64>() / players.len() as f64
        };
        let self_scale_rating = if players.is_empty() {
            experience_to_self_clamped(experience_rating)
        } else {
            players
                .iter()
                .map(|p| experience_to_self_clamped(p.experience_rating))
                .sum::<f64>()
                / players.len() as f64
        };

        Some(ReconciledTeam {
            team,
            players,
            experience_rating,
            self_scale_rating,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::experience::ExperienceConfig;
    use crate::roster::RosterGraph;

    #[test]
    fn interior_control_points_map_exactly() {
        assert_eq!(self_to_experience(50.0).unwrap(), 1200.0);
        assert_eq!(self_to_experience(0.0).unwrap(), 500.0);
        assert_eq!(self_to_experience(100.0).unwrap(), 2000.0);
    }

    #[test]
    fn interpolates_between_points() {
        // Halfway between 20 -> 800 and 30 -> 900.
        assert!((self_to_experience(25.0).unwrap() - 850.0).abs() < 1e-9);
    }

    #[test]
    fn round_trip_at_interior_point() {
        let experience = self_to_experience(50.0).unwrap();
        let back = experience_to_self(experience).unwrap();
        assert!((back - 50.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_domain_is_an_error() {
        assert!(matches!(
            self_to_experience(101.0),
            Err(CalibrationError::OutOfDomain { .. })
        ));
        assert!(experience_to_self(-501.0).is_err());
        assert_eq!(experience_to_self_clamped(99_999.0), 100.0);
    }

    #[test]
    fn nan_rank_sentinel_becomes_unrated() {
        let raw = r#"[
            {"league_id": 40100, "first_name": "Jane", "last_name": "Doe",
             "rank_type": 1, "rank": "nan", "captain_rank": null},
            {"league_id": 40100, "first_name": "Rich", "last_name": "Roe",
             "rank_type": 1, "rank": 70, "captain_rank": 65.0}
        ]"#;
        let table = AssessmentTable::from_json(raw).unwrap();
        assert_eq!(
            table.draft_rank(LeagueId(40100), "jane", "doe"),
            Some(UNRATED_SELF_RANK)
        );
        assert_eq!(table.draft_rank(LeagueId(40100), "rich", "roe"), Some(70.0));
        assert_eq!(
            table.captain_rank(LeagueId(40100), "rich", "roe"),
            Some(65.0)
        );
        assert_eq!(table.draft_rank(LeagueId(99), "rich", "roe"), None);
    }

    #[test]
    fn nan_captain_rank_is_skipped_not_fatal() {
        let raw = r#"[
            {"league_id": 40100, "first_name": "Jane", "last_name": "Doe",
             "rank_type": 1, "rank": 40, "captain_rank": "nan"},
            {"league_id": 40100, "first_name": "Jane", "last_name": "Doe",
             "rank_type": 2, "rank": 45, "captain_rank": 55.0}
        ]"#;
        let table = AssessmentTable::from_json(raw).unwrap();
        // The sentinel row contributes nothing; the numeric row wins.
        assert_eq!(
            table.captain_rank(LeagueId(40100), "jane", "doe"),
            Some(55.0)
        );
        assert_eq!(table.draft_rank(LeagueId(40100), "jane", "doe"), Some(40.0));
    }

    fn fixture() -> (RosterGraph, HashMap<TeamId, f64>) {
        let mut roster = RosterGraph::default();
        roster.insert_team(TeamId(10), ["Vet, Val"]).unwrap();
        roster
            .insert_team(TeamId(40), ["Vet, Val", "New, Nora", "Ghost, Gary"])
            .unwrap();
        let ratings = HashMap::from([(TeamId(10), 1500.0)]);
        (roster, ratings)
    }

    #[test]
    fn reconciler_overrides_only_history_free_players() {
        let (roster, ratings) = fixture();
        let estimator = ExperienceEstimator::new(&roster, &ratings, ExperienceConfig::default());

        let rows = vec![AssessmentRow {
            league_id: LeagueId(7),
            first_name: "Nora".to_string(),
            last_name: "New".to_string(),
            rank_type: 1,
            rank: Some(60.0),
            captain_rank: None,
        }];
        let table = AssessmentTable::from_rows(rows);
        let reconciler = Reconciler::new(&table);

        let team = reconciler
            .reconcile_team(&estimator, LeagueId(7), TeamId(40))
            .unwrap();

        let val = team.players.iter().find(|p| p.name == "Vet, Val").unwrap();
        assert!(val.from_history);
        assert!(!val.overridden);
        assert_eq!(val.experience_rating, 1500.0);

        // Nora has no history but a self rank of 60 -> 1400.
        let nora = team.players.iter().find(|p| p.name == "New, Nora").unwrap();
        assert!(nora.overridden);
        assert_eq!(nora.experience_rating, 1400.0);

        // Gary has neither history nor assessment: he is assumed to be a
        // median draft pick, rank 50 -> 1200.
        let gary = team
            .players
            .iter()
            .find(|p| p.name == "Ghost, Gary")
            .unwrap();
        assert!(!gary.overridden);
        assert_eq!(gary.experience_rating, 1200.0);
        assert_eq!(gary.self_rank, Some(DEFAULT_DRAFT_RANK));
    }

    #[test]
    fn missing_assessment_row_defaults_draft_to_fifty() {
        let (roster, ratings) = fixture();
        let estimator = ExperienceEstimator::new(&roster, &ratings, ExperienceConfig::default());

        // No assessments at all: every history-free player is scored as a
        // median draft pick, never left on the 800 floor.
        let table = AssessmentTable::default();
        let reconciler = Reconciler::new(&table);
        let team = reconciler
            .reconcile_team(&estimator, LeagueId(7), TeamId(40))
            .unwrap();

        for name in ["New, Nora", "Ghost, Gary"] {
            let player = team.players.iter().find(|p| p.name == name).unwrap();
            assert_eq!(player.experience_rating, 1200.0);
            assert!(!player.overridden);
            assert_eq!(player.draft_rank, None);
        }

        // History is still never displaced by the default.
        let val = team.players.iter().find(|p| p.name == "Vet, Val").unwrap();
        assert_eq!(val.experience_rating, 1500.0);
    }

    #[test]
    fn captain_rank_wins_over_draft_rank() {
        let (roster, ratings) = fixture();
        let estimator = ExperienceEstimator::new(&roster, &ratings, ExperienceConfig::default());

        let rows = vec![AssessmentRow {
            league_id: LeagueId(7),
            first_name: "Nora".to_string(),
            last_name: "New".to_string(),
            rank_type: 1,
            rank: Some(90.0),
            captain_rank: Some(30.0),
        }];
        let table = AssessmentTable::from_rows(rows);
        let reconciler = Reconciler::new(&table);
        let team = reconciler
            .reconcile_team(&estimator, LeagueId(7), TeamId(40))
            .unwrap();

        let nora = team.players.iter().find(|p| p.name == "New, Nora").unwrap();
        // Captain says 30 -> 900, despite the optimistic self rank.
        assert_eq!(nora.experience_rating, 900.0);
        // Self signal 2*90 - 30.
        assert_eq!(nora.self_rank, Some(150.0));
    }
}
