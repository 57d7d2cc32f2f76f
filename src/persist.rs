//! Cache-directory resolution and atomic JSON writes, shared by the http
//! body cache and the ratings snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

const CACHE_DIR: &str = "league_ratings";

/// Per-user cache directory: `$XDG_CACHE_HOME/league_ratings`, falling back
/// to `~/.cache/league_ratings`. None when neither variable is usable.
pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

/// Serialize to JSON and swap into place through a sibling tmp file, so a
/// crash mid-write never leaves a truncated document at `path`.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let json = serde_json::to_string(value).context("serialize json")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap into {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_leaves_no_tmp_file_behind() {
        let path = std::env::temp_dir().join(format!(
            "league_ratings_persist_{}.json",
            std::process::id()
        ));
        write_json_atomic(&path, &vec![1u32, 2, 3]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "[1,2,3]");
        assert!(!path.with_extension("json.tmp").exists());

        fs::remove_file(&path).ok();
    }
}
