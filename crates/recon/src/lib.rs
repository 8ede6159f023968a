//! `matchday-recon`: fixture/prediction reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded fixtures and predictions, returns
//! merged records with stats and a validation report. No CLI or IO.

pub mod adapter;
pub mod aliases;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod key;
pub mod matcher;
pub mod merge;
pub mod model;
pub mod stats;
pub mod validate;

pub use adapter::{parse_fixtures_json, parse_predictions_json};
pub use aliases::AliasTable;
pub use config::{EngineConfig, MatchConfig, MergeOptions};
pub use engine::{process, run, ProcessOptions};
pub use error::ReconError;
pub use filter::FixtureFilter;
pub use model::{Fixture, MergedData, MergedFixture, Prediction, ProcessResult};
