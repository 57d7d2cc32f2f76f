use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::persist::{app_cache_dir, write_json_atomic};
use crate::store::RatingDatabase;

const SNAPSHOT_VERSION: u32 = 1;
const SNAPSHOT_FILE: &str = "ratings_snapshot.json";

/// Durable form of a build: the core maps plus the flattened team table.
/// The contract is only that load produces exactly what was dumped; a
/// version bump invalidates old files rather than migrating them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    version: u32,
    generated_at: String,
    db: RatingDatabase,
}

impl Snapshot {
    pub fn of(db: &RatingDatabase) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            db: db.clone(),
        }
    }

    pub fn into_database(self) -> RatingDatabase {
        self.db
    }

    pub fn generated_at(&self) -> &str {
        &self.generated_at
    }
}

pub fn default_snapshot_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(SNAPSHOT_FILE))
}

/// Load a previously saved snapshot. A missing file or a version mismatch
/// means "start fresh" (None), not an error; a corrupt file is an error the
/// caller can surface.
pub fn load(path: &Path) -> Result<Option<Snapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read snapshot {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("parse snapshot {}", path.display()))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Ok(None);
    }
    Ok(Some(snapshot))
}

pub fn save(path: &Path, snapshot: &Snapshot) -> Result<()> {
    write_json_atomic(path, snapshot).context("save snapshot")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::ids::{LeagueId, TeamId};

    #[test]
    fn round_trips_through_json() {
        let mut db = RatingDatabase::default();
        db.league_teams.insert(LeagueId(40100), vec![TeamId(7)]);
        db.team_rating = HashMap::from([(TeamId(7), 1234.5)]);
        db.roster
            .insert_team(TeamId(7), ["Doe, Jane"])
            .unwrap();

        let snapshot = Snapshot::of(&db);
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: Snapshot = serde_json::from_str(&json).unwrap();
        let restored = restored.into_database();

        assert_eq!(restored.league_teams, db.league_teams);
        assert_eq!(restored.team_rating, db.team_rating);
        assert_eq!(
            restored.roster.player_history("Doe, Jane"),
            Some(&[TeamId(7)][..])
        );
    }
}
