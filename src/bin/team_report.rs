use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use league_ratings::experience::ExperienceConfig;
use league_ratings::ids::TeamId;
use league_ratings::reconcile::{AssessmentTable, Reconciler};
use league_ratings::snapshot;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let team_ids = parse_team_ids()?;
    if team_ids.is_empty() {
        return Err(anyhow!("usage: team_report [--snapshot PATH] [--assessments PATH] TEAM_ID..."));
    }

    let snapshot_path = parse_path_arg("--snapshot")
        .or_else(snapshot::default_snapshot_path)
        .context("unable to resolve snapshot path")?;
    let db = snapshot::load(&snapshot_path)?
        .with_context(|| format!("no snapshot at {}", snapshot_path.display()))?
        .into_database();

    let assessments = match parse_path_arg("--assessments") {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("read assessments {}", path.display()))?;
            AssessmentTable::from_json(&raw)?
        }
        None => AssessmentTable::default(),
    };

    let estimator = db.estimator(ExperienceConfig::default());
    let reconciler = Reconciler::new(&assessments);

    for team_id in team_ids {
        let Some(record) = db.record_for(team_id) else {
            println!("team {team_id}: not in snapshot");
            continue;
        };
        println!(
            "team {} {:?}: {} {} ({}), div {:?}, observed rating {:.0}",
            team_id,
            record.team_name,
            record
                .season
                .map_or("?".to_string(), |s| s.to_string()),
            record
                .category
                .map_or("?".to_string(), |c| c.to_string()),
            record.year.map_or("?".to_string(), |y| y.to_string()),
            record.division,
            record.rating,
        );

        let Some(league) = db.league_of(team_id) else {
            println!("  no league membership recorded");
            continue;
        };
        let Some(reconciled) = reconciler.reconcile_team(&estimator, league, team_id) else {
            println!("  no roster on record");
            continue;
        };
        println!(
            "  predicted rating {:.0} (self scale {:.0})",
            reconciled.experience_rating, reconciled.self_scale_rating
        );

        let detail = estimator.team_detail(team_id).unwrap_or_default();
        for player in &reconciled.players {
            let seasons = detail.iter().find(|d| d.name == player.name);
            let (club, hat) = seasons.map_or((0, 0), |d| (d.club_seasons, d.hat_seasons));
            let origin = if player.from_history {
                "history"
            } else if player.overridden {
                "assessment"
            } else {
                "default"
            };
            println!(
                "   {:<28} {:>6.0}  ({origin}; {club} club / {hat} hat seasons)",
                player.name, player.experience_rating
            );
        }
    }

    Ok(())
}

fn parse_team_ids() -> Result<Vec<TeamId>> {
    let mut ids = Vec::new();
    let mut skip_next = false;
    for arg in std::env::args().skip(1) {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--snapshot" || arg == "--assessments" {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        ids.push(
            arg.parse::<TeamId>()
                .map_err(|_| anyhow!("invalid team id {arg:?}"))?,
        );
    }
    Ok(ids)
}

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&format!("{name}=")) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next.trim()));
        }
    }
    None
}
