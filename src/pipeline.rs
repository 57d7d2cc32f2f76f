use anyhow::Result;
use tracing::{error, info, warn};

use crate::catalog::{League, LeagueCatalog};
use crate::divisions::DivisionRatingTable;
use crate::experience::ExperienceConfig;
use crate::ids::LeagueId;
use crate::ledger::{LedgerConfig, build_ledger, observed_divisions};
use crate::snapshot::Snapshot;
use crate::source::LeagueSource;
use crate::store::{RatingDatabase, TeamRecord};

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineConfig {
    pub ledger: LedgerConfig,
    pub experience: ExperienceConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeagueStatus {
    Processed,
    /// Present in the prior snapshot; not reprocessed.
    SkippedExisting,
    /// Category is neither Hat nor Club (or failed to parse).
    SkippedCategory,
    /// Schedule empty or without divisions; nothing to rate.
    SkippedNoData,
    /// Ledger or fetch failure; see `errors`.
    Failed,
}

/// Outcome of one league, successes and failures collected side by side.
/// One bad league never aborts the batch.
#[derive(Debug, Clone)]
pub struct LeagueOutcome {
    pub league_id: LeagueId,
    pub name: String,
    pub status: LeagueStatus,
    pub teams_recorded: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub leagues_total: usize,
    pub processed: usize,
    pub skipped_existing: usize,
    pub per_league: Vec<LeagueOutcome>,
}

impl BuildSummary {
    pub fn failures(&self) -> impl Iterator<Item = &LeagueOutcome> {
        self.per_league
            .iter()
            .filter(|o| o.status == LeagueStatus::Failed || !o.errors.is_empty())
    }
}

#[derive(Debug)]
pub struct BuildOutcome {
    pub db: RatingDatabase,
    pub summary: BuildSummary,
}

/// Fetch the raw league list and parse it into a catalog.
pub fn build_catalog(source: &dyn LeagueSource) -> Result<LeagueCatalog> {
    let raw = source.leagues()?;
    Ok(LeagueCatalog::from_raw(&raw))
}

/// Run the batch: for every league in catalog order, build its score ledger,
/// record rosters, and fill the team rating store. Leagues already present
/// in the prior snapshot are skipped by identity, which makes re-runs
/// idempotent over partial results.
pub fn build_database(
    source: &dyn LeagueSource,
    catalog: &LeagueCatalog,
    tables: &DivisionRatingTable,
    cfg: PipelineConfig,
    prior: Option<Snapshot>,
) -> BuildOutcome {
    let mut db = prior.map(Snapshot::into_database).unwrap_or_default();
    let mut summary = BuildSummary {
        leagues_total: catalog.len(),
        ..BuildSummary::default()
    };

    for league in catalog.iter() {
        if db.contains_league(league.id) {
            summary.skipped_existing += 1;
            summary.per_league.push(LeagueOutcome {
                league_id: league.id,
                name: league.name.clone(),
                status: LeagueStatus::SkippedExisting,
                teams_recorded: db
                    .league_teams
                    .get(&league.id)
                    .map_or(0, Vec::len),
                errors: Vec::new(),
            });
            continue;
        }

        let outcome = process_league(source, league, tables, cfg, &mut db);
        if outcome.status == LeagueStatus::Processed {
            summary.processed += 1;
        }
        summary.per_league.push(outcome);
    }

    BuildOutcome { db, summary }
}

fn process_league(
    source: &dyn LeagueSource,
    league: &League,
    tables: &DivisionRatingTable,
    cfg: PipelineConfig,
    db: &mut RatingDatabase,
) -> LeagueOutcome {
    let mut outcome = LeagueOutcome {
        league_id: league.id,
        name: league.name.clone(),
        status: LeagueStatus::Processed,
        teams_recorded: 0,
        errors: Vec::new(),
    };

    // Only Hat and Club leagues carry ratings; anything else (clinics,
    // tournaments, unparseable names) is skipped up front.
    if league.category.is_none() {
        info!(league = %league.id, name = %league.name, "not Hat or Club, skipping");
        outcome.status = LeagueStatus::SkippedCategory;
        return outcome;
    }

    let rows = match source.schedule(league.id) {
        Ok(rows) => rows,
        Err(err) => {
            warn!(league = %league.id, %err, "schedule fetch failed");
            outcome.status = LeagueStatus::Failed;
            outcome.errors.push(format!("schedule fetch: {err}"));
            return outcome;
        }
    };
    if rows.is_empty() {
        info!(league = %league.id, "no schedule rows");
        outcome.status = LeagueStatus::SkippedNoData;
        return outcome;
    }

    let divisions = observed_divisions(&rows);
    if divisions.is_empty() {
        info!(league = %league.id, "no divisions found, skipping");
        outcome.status = LeagueStatus::SkippedNoData;
        return outcome;
    }

    let rating_key = league.rating_key();
    let division_ratings = tables.table_for_league(rating_key.as_deref(), &divisions);
    if rating_key
        .as_deref()
        .is_none_or(|key| !tables.has_table(key))
    {
        // Degraded-data path: every team in this league rates near zero and
        // will be screened out by the experience threshold downstream.
        info!(league = %league.id, key = rating_key.as_deref().unwrap_or("?"),
              "no hand-specified division table, using zero base ratings");
    }

    let ledger = match build_ledger(&rows, &division_ratings, cfg.ledger) {
        Ok(ledger) => ledger,
        Err(err) => {
            warn!(league = %league.id, %err, "ledger build failed, skipping league");
            outcome.status = LeagueStatus::Failed;
            outcome.errors.push(err.to_string());
            return outcome;
        }
    };

    let teams = match source.teams(league.id) {
        Ok(teams) => teams,
        Err(err) => {
            warn!(league = %league.id, %err, "team list fetch failed");
            outcome.status = LeagueStatus::Failed;
            outcome.errors.push(format!("team list fetch: {err}"));
            return outcome;
        }
    };

    let mut recorded = Vec::new();
    for (team_id, team_name) in &teams {
        // Duplicate ids are a data-integrity alarm, not something to paper
        // over: flag loudly, keep the first roster, skip the rest.
        if db.team_rating.contains_key(team_id) || db.roster.contains_team(*team_id) {
            error!(team = %team_id, league = %league.id, "duplicate team id, refusing to overwrite");
            outcome
                .errors
                .push(format!("duplicate team id {team_id} ({team_name})"));
            continue;
        }

        let Some(standing) = ledger
            .iter()
            .find(|s| s.team_name.eq_ignore_ascii_case(team_name.trim()))
        else {
            warn!(team = %team_name, league = %league.id, "no score-ledger match, skipping team");
            outcome
                .errors
                .push(format!("could not match {team_name:?} to the score ledger"));
            continue;
        };

        match source.roster(*team_id) {
            Ok(players) => {
                if let Err(err) = db.roster.insert_team(*team_id, &players) {
                    error!(team = %team_id, %err, "roster insert refused");
                    outcome.errors.push(err.to_string());
                    continue;
                }
            }
            Err(err) => {
                // A team with no resolved roster still belongs in the
                // ledger; only the roster graph goes without it.
                warn!(team = %team_id, %err, "roster fetch failed");
                outcome.errors.push(format!("roster fetch {team_id}: {err}"));
            }
        }

        db.team_rating.insert(*team_id, standing.rating);
        db.teams.push(TeamRecord {
            team_id: *team_id,
            team_name: team_name.clone(),
            league_id: league.id,
            season: league.season,
            category: league.category,
            year: league.year,
            division: standing.division.clone(),
            base_rating: standing.base_rating,
            avg_differential: standing.avg_differential,
            rating: standing.rating,
        });
        recorded.push(*team_id);
    }

    outcome.teams_recorded = recorded.len();
    db.league_teams.insert(league.id, recorded);
    info!(league = %league.id, teams = outcome.teams_recorded, "league processed");
    outcome
}
