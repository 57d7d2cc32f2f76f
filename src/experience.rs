use std::collections::HashMap;

use crate::ids::TeamId;
use crate::roster::RosterGraph;

/// Rating assigned to a player with no usable club history on record.
pub const DEFAULT_PLAYER_RATING: f64 = 800.0;

/// Team ratings at or below this are unrated/hat placeholders (zero-fallback
/// division tables put them near zero) and say nothing about club skill, so
/// the estimator screens them out before averaging.
pub const CLUB_RATING_THRESHOLD: f64 = 400.0;

/// Both knobs are universal across league categories as far as the data
/// shows; they live here so a per-category experiment is a construction-site
/// change only.
#[derive(Debug, Clone, Copy)]
pub struct ExperienceConfig {
    pub default_rating: f64,
    pub club_threshold: f64,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            default_rating: DEFAULT_PLAYER_RATING,
            club_threshold: CLUB_RATING_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerRating {
    pub name: String,
    pub rating: f64,
    /// True when the rating came from prior club teams rather than the
    /// default floor. The reconciler only overrides players where this is
    /// false.
    pub from_history: bool,
}

#[derive(Debug, Clone)]
pub struct TeamPrediction {
    pub team: TeamId,
    pub players: Vec<PlayerRating>,
    /// Unweighted mean of the player ratings.
    pub rating: f64,
}

/// Per-player season breakdown for the detail report: previous seasons split
/// into club (above threshold) and hat (at or below) by the same screen the
/// estimator uses.
#[derive(Debug, Clone)]
pub struct PlayerSeasonDetail {
    pub name: String,
    pub club_seasons: usize,
    pub hat_seasons: usize,
    pub club_rating: f64,
    pub hat_rating: f64,
}

/// Derives experience ratings from what a player's previous teams achieved.
///
/// "Previous" is strictly smaller numeric team id; ids are assigned in time
/// order upstream, so this is the no-lookahead cut. The reference team
/// itself is always excluded.
pub struct ExperienceEstimator<'a> {
    roster: &'a RosterGraph,
    team_rating: &'a HashMap<TeamId, f64>,
    cfg: ExperienceConfig,
}

impl<'a> ExperienceEstimator<'a> {
    pub fn new(
        roster: &'a RosterGraph,
        team_rating: &'a HashMap<TeamId, f64>,
        cfg: ExperienceConfig,
    ) -> Self {
        Self {
            roster,
            team_rating,
            cfg,
        }
    }

    pub fn config(&self) -> ExperienceConfig {
        self.cfg
    }

    /// Experience rating for one player, looking only at teams before
    /// `before`. No history, or history that the threshold filter empties,
    /// falls back to the default floor.
    pub fn player_rating(&self, player: &str, before: TeamId) -> PlayerRating {
        let previous = self.previous_ratings(player, before);
        let qualified: Vec<f64> = previous
            .iter()
            .copied()
            .filter(|r| *r > self.cfg.club_threshold)
            .collect();

        if qualified.is_empty() {
            return PlayerRating {
                name: player.to_string(),
                rating: self.cfg.default_rating,
                from_history: false,
            };
        }
        PlayerRating {
            name: player.to_string(),
            rating: mean(&qualified),
            from_history: true,
        }
    }

    /// Predicted rating for a team that has not played yet: the unweighted
    /// mean of its players' experience ratings. None when the roster is
    /// unknown.
    pub fn predict_team(&self, team: TeamId) -> Option<TeamPrediction> {
        let players = self.roster.team_players(team)?;
        let ratings: Vec<PlayerRating> = players
            .iter()
            .map(|p| self.player_rating(p, team))
            .collect();
        let rating = mean_or(
            &ratings.iter().map(|p| p.rating).collect::<Vec<_>>(),
            self.cfg.default_rating,
        );
        Some(TeamPrediction {
            team,
            players: ratings,
            rating,
        })
    }

    /// Season-count detail for every player on a team.
    pub fn team_detail(&self, team: TeamId) -> Option<Vec<PlayerSeasonDetail>> {
        let players = self.roster.team_players(team)?;
        let detail = players
            .iter()
            .map(|player| {
                let previous = self.previous_ratings(player, team);
                let (club, hat): (Vec<f64>, Vec<f64>) = previous
                    .iter()
                    .partition(|r| **r > self.cfg.club_threshold);
                PlayerSeasonDetail {
                    name: player.clone(),
                    club_seasons: club.len(),
                    hat_seasons: hat.len(),
                    club_rating: mean_or(&club, self.cfg.default_rating),
                    hat_rating: mean_or(&hat, 0.0),
                }
            })
            .collect();
        Some(detail)
    }

    fn previous_ratings(&self, player: &str, before: TeamId) -> Vec<f64> {
        self.roster
            .player_history_sorted(player)
            .into_iter()
            .filter(|id| *id < before)
            .filter_map(|id| self.team_rating.get(&id).copied())
            .collect()
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn mean_or(values: &[f64], default: f64) -> f64 {
    if values.is_empty() {
        default
    } else {
        mean(values)
    }
}
