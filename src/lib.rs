//! Experience-based skill ratings for recreational league players and teams.
//!
//! The pipeline turns historical game results, division placements, and
//! rosters into a per-team rating store, then predicts the strength of a
//! team that has not played yet from what its players' previous teams
//! achieved. All heuristic and explainable by construction: a division base
//! rating, a score-differential adjustment, and an averaged history.

pub mod catalog;
pub mod divisions;
pub mod experience;
pub mod fake_source;
pub mod http_cache;
pub mod http_client;
pub mod ids;
pub mod ledger;
pub mod persist;
pub mod pipeline;
pub mod reconcile;
pub mod roster;
pub mod snapshot;
pub mod source;
pub mod store;
