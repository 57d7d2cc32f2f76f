use std::fs;
use std::path::PathBuf;

use league_ratings::catalog::{LeagueCatalog, LeagueCategory, Season};
use league_ratings::ids::{LeagueId, TeamId};
use league_ratings::source::{
    parse_leagues_json, parse_roster_json, parse_schedule_json, parse_teams_json,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_leagues_fixture_into_catalog() {
    let raw = read_fixture("leagues.json");
    let leagues = parse_leagues_json(&raw).expect("fixture should parse");
    assert_eq!(leagues.len(), 4);

    let catalog = LeagueCatalog::from_raw(&leagues);
    let summer = catalog.lookup(LeagueId(40100)).unwrap();
    assert_eq!(summer.season, Some(Season::Summer));
    assert_eq!(summer.category, Some(LeagueCategory::Club));
    assert_eq!(summer.year, Some(2014));

    // Winter leagues are forced to Hat even when named Club.
    let winter = catalog.lookup(LeagueId(40200)).unwrap();
    assert_eq!(winter.category, Some(LeagueCategory::Hat));

    // Non-league entries parse to nothing rather than failing.
    let other = catalog.lookup(LeagueId(40250)).unwrap();
    assert_eq!(other.season, None);
    assert_eq!(other.category, None);
}

#[test]
fn parses_schedule_fixture_with_headers() {
    let raw = read_fixture("schedule.json");
    let rows = parse_schedule_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 6);
    assert!(rows[0].is_header());
    assert_eq!(rows[0].team, "4/3 Div 1");
    assert_eq!(rows[1].record.as_deref(), Some("9-3"));
    assert_eq!(rows[1].plus_minus, Some(60.0));
    assert_eq!(rows[2].plus_minus, Some(-60.0));
    assert!(rows[3].is_header());
}

#[test]
fn parses_teams_fixture_dropping_bad_ids() {
    let raw = read_fixture("teams.json");
    let teams = parse_teams_json(&raw).expect("fixture should parse");
    assert_eq!(teams.len(), 3);
    assert_eq!(teams[0], (TeamId(501), "Red Fish".to_string()));
    assert!(teams.iter().all(|(_, name)| name != "Not A Team"));
}

#[test]
fn parses_roster_fixture_keeping_raw_names() {
    let raw = read_fixture("roster.json");
    let roster = parse_roster_json(&raw).expect("fixture should parse");
    // Blank entries are dropped; names stay raw for the graph to normalize.
    assert_eq!(roster.len(), 3);
    assert_eq!(roster[0], "Doe,  Jane");
    assert_eq!(roster[2], "Chen, Ana, Ace");
}
