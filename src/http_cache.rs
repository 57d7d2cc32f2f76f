use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::persist::{app_cache_dir, write_json_atomic};

const CACHE_VERSION: u32 = 1;
const CACHE_FILE: &str = "http_cache.json";

static CACHE: Mutex<Option<BodyCache>> = Mutex::new(None);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct BodyCache {
    version: u32,
    entries: HashMap<String, CachedBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedBody {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

impl CachedBody {
    fn attach_validators(&self, req: RequestBuilder) -> RequestBuilder {
        let req = match self.etag.as_ref() {
            Some(etag) => req.header(IF_NONE_MATCH, etag),
            None => req,
        };
        match self.last_modified.as_ref() {
            Some(stamp) => req.header(IF_MODIFIED_SINCE, stamp),
            None => req,
        }
    }
}

/// Fetch a JSON body through a persistent conditional-GET cache. Historical
/// league pages never change once the season ends, so revalidation turns a
/// full rescrape into a stream of 304s.
pub fn fetch_json_cached(client: &Client, url: &str) -> Result<String> {
    let known = cached_body(url);

    let mut req = client.get(url).header(USER_AGENT, "league-ratings/0.1");
    if let Some(entry) = known.as_ref() {
        req = entry.attach_validators(req);
    }
    let resp = req.send().context("request failed")?;

    if resp.status() == StatusCode::NOT_MODIFIED {
        let entry = known.ok_or_else(|| anyhow!("received 304 without cache body"))?;
        store_body(url, entry.clone());
        return Ok(entry.body);
    }

    let status = resp.status();
    let header = |name| {
        resp.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let (etag, last_modified) = (header(ETAG), header(LAST_MODIFIED));

    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {status}: {body}"));
    }

    store_body(
        url,
        CachedBody {
            body: body.clone(),
            etag,
            last_modified,
            fetched_at: unix_now(),
        },
    );
    Ok(body)
}

fn cached_body(url: &str) -> Option<CachedBody> {
    let mut guard = CACHE.lock().expect("http cache lock poisoned");
    guard.get_or_insert_with(load_cache_file).entries.get(url).cloned()
}

fn store_body(url: &str, entry: CachedBody) {
    let mut guard = CACHE.lock().expect("http cache lock poisoned");
    let cache = guard.get_or_insert_with(load_cache_file);
    cache.version = CACHE_VERSION;
    cache.entries.insert(url.to_string(), entry);
    if let Some(path) = cache_path() {
        let _ = write_json_atomic(&path, cache);
    }
}

fn load_cache_file() -> BodyCache {
    let raw = cache_path().and_then(|path| fs::read_to_string(path).ok());
    let cache = raw
        .and_then(|raw| serde_json::from_str::<BodyCache>(&raw).ok())
        .unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return BodyCache::default();
    }
    cache
}

fn cache_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(CACHE_FILE))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
