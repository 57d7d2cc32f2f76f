use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use league_ratings::divisions::DivisionRatingTable;
use league_ratings::fake_source::demo_source;
use league_ratings::pipeline::{self, BuildOutcome, LeagueStatus, PipelineConfig};
use league_ratings::snapshot;
use league_ratings::source::{HttpSource, LeagueSource};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let source = resolve_source()?;
    let snapshot_path = parse_path_arg("--snapshot")
        .or_else(|| std::env::var("RATINGS_SNAPSHOT").ok().map(PathBuf::from))
        .or_else(snapshot::default_snapshot_path)
        .context("unable to resolve snapshot path")?;

    let prior = if has_flag("--fresh") {
        None
    } else {
        snapshot::load(&snapshot_path)?
    };
    if let Some(prior) = prior.as_ref() {
        println!(
            "Resuming from snapshot {} (generated {})",
            snapshot_path.display(),
            prior.generated_at()
        );
    }

    let catalog = pipeline::build_catalog(source.as_ref())?;
    println!("Catalog: {} leagues", catalog.len());

    let outcome = pipeline::build_database(
        source.as_ref(),
        &catalog,
        &DivisionRatingTable::default(),
        PipelineConfig::default(),
        prior,
    );
    print_summary(&outcome);

    snapshot::save(&snapshot_path, &snapshot::Snapshot::of(&outcome.db))?;
    println!("Snapshot saved to {}", snapshot_path.display());
    Ok(())
}

fn resolve_source() -> Result<Box<dyn LeagueSource>> {
    let kind = parse_value_arg("--source")
        .or_else(|| std::env::var("RATINGS_SOURCE").ok())
        .unwrap_or_else(|| "http".to_string());
    match kind.as_str() {
        "demo" => Ok(Box::new(demo_source(42))),
        "http" => {
            let base_url = parse_value_arg("--base-url")
                .or_else(|| std::env::var("RATINGS_BASE_URL").ok())
                .context("RATINGS_BASE_URL or --base-url required for the http source")?;
            Ok(Box::new(HttpSource::new(&base_url)))
        }
        other => Err(anyhow!("unknown source {other:?} (expected http or demo)")),
    }
}

fn print_summary(outcome: &BuildOutcome) {
    let summary = &outcome.summary;
    println!("Build complete");
    println!(
        "Leagues: {} processed, {} already present, {} total",
        summary.processed, summary.skipped_existing, summary.leagues_total
    );
    println!(
        "Teams rated: {} ({} players seen)",
        outcome.db.team_count(),
        outcome.db.roster.player_count()
    );

    for item in summary.failures() {
        let status = match item.status {
            LeagueStatus::Failed => "failed",
            _ => "partial",
        };
        println!(
            "league {} ({}): {} teams={}",
            item.league_id, item.name, status, item.teams_recorded
        );
        for err in item.errors.iter().take(6) {
            println!("   - {err}");
        }
    }
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}

fn parse_value_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&format!("{name}=")) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    parse_value_arg(name).map(PathBuf::from)
}
