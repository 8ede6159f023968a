use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Provider match status. Unknown provider values are carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    Scheduled,
    Timed,
    Live,
    InPlay,
    Paused,
    Finished,
    Postponed,
    Cancelled,
    Suspended,
    Awarded,
    Other(String),
}

impl MatchStatus {
    /// Case-insensitive; accepts `IN_PLAY`, `in-play` and `in play`.
    pub fn parse(value: &str) -> Self {
        let norm: String = value
            .trim()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c.to_ascii_uppercase() })
            .collect();
        match norm.as_str() {
            "SCHEDULED" => Self::Scheduled,
            "TIMED" => Self::Timed,
            "LIVE" => Self::Live,
            "IN_PLAY" => Self::InPlay,
            "PAUSED" => Self::Paused,
            "FINISHED" => Self::Finished,
            "POSTPONED" => Self::Postponed,
            "CANCELLED" | "CANCELED" => Self::Cancelled,
            "SUSPENDED" => Self::Suspended,
            "AWARDED" => Self::Awarded,
            _ => Self::Other(value.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Timed => "TIMED",
            Self::Live => "LIVE",
            Self::InPlay => "IN_PLAY",
            Self::Paused => "PAUSED",
            Self::Finished => "FINISHED",
            Self::Postponed => "POSTPONED",
            Self::Cancelled => "CANCELLED",
            Self::Suspended => "SUSPENDED",
            Self::Awarded => "AWARDED",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MatchStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    #[default]
    Pending,
    Scored,
}

impl PredictionStatus {
    /// Anything other than "pending" counts as already scored.
    pub fn parse(value: &str) -> Self {
        let v = value.trim();
        if v.is_empty() || v.eq_ignore_ascii_case("pending") {
            Self::Pending
        } else {
            Self::Scored
        }
    }
}

/// A provider fixture after source adaptation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub id: Option<String>,
    pub home_team: String,
    pub away_team: String,
    /// Kickoff as received, kept verbatim for validation.
    pub date: Option<String>,
    #[serde(skip)]
    pub kickoff: Option<DateTime<Utc>>,
    pub status: Option<MatchStatus>,
    pub venue: Option<String>,
    pub competition: Option<String>,
    pub competition_code: Option<String>,
    pub referee: Option<String>,
    pub gameweek: Option<u32>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    #[serde(skip)]
    pub source: Option<String>,
    /// Input fields that were present but could not be read (e.g. `gameweek`).
    #[serde(skip)]
    pub unreadable: Vec<String>,
}

/// A stored user prediction after source adaptation.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub id: Option<String>,
    pub match_id: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub date: Option<String>,
    pub kickoff: Option<DateTime<Utc>>,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub home_scorers: Vec<String>,
    pub away_scorers: Vec<String>,
    pub chips: Vec<String>,
    pub submitted_at: Option<String>,
    pub status: PredictionStatus,
    pub actual_home_scorers: Option<Vec<String>>,
    pub actual_away_scorers: Option<Vec<String>>,
    /// Input fields that were present but could not be read (e.g. `homeScore`).
    pub unreadable: Vec<String>,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Which matching tier accepted a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Identifier,
    Key,
    Proximity,
    Alias,
    Similarity,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identifier => write!(f, "identifier"),
            Self::Key => write!(f, "key"),
            Self::Proximity => write!(f, "proximity"),
            Self::Alias => write!(f, "alias"),
            Self::Similarity => write!(f, "similarity"),
        }
    }
}

/// A prediction accepted for a fixture, with its position in the input slice.
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub prediction: &'a Prediction,
    pub index: usize,
    pub tier: MatchTier,
}

// ---------------------------------------------------------------------------
// Merge output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionSummary {
    pub id: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub home_scorers: Vec<String>,
    pub away_scorers: Vec<String>,
    pub chips: Vec<String>,
    pub submitted_at: Option<String>,
    pub status: PredictionStatus,
    pub actual_home_scorers: Option<Vec<String>>,
    pub actual_away_scorers: Option<Vec<String>>,
    #[serde(skip)]
    pub unreadable: Vec<String>,
}

impl From<&Prediction> for PredictionSummary {
    fn from(p: &Prediction) -> Self {
        Self {
            id: p.id.clone(),
            home_team: p.home_team.clone(),
            away_team: p.away_team.clone(),
            home_score: p.home_score,
            away_score: p.away_score,
            home_scorers: p.home_scorers.clone(),
            away_scorers: p.away_scorers.clone(),
            chips: p.chips.clone(),
            submitted_at: p.submitted_at.clone(),
            status: p.status,
            actual_home_scorers: p.actual_home_scorers.clone(),
            actual_away_scorers: p.actual_away_scorers.clone(),
            unreadable: p.unreadable.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeInfo {
    pub prediction_matched: bool,
    pub fixture_key: String,
    pub merged_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_by: Option<MatchTier>,
    /// Position of the matched prediction in the input slice.
    #[serde(skip)]
    pub prediction_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSources {
    pub fixture: String,
    pub prediction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedFixture {
    #[serde(flatten)]
    pub fixture: Fixture,
    pub predicted: bool,
    pub user_prediction: Option<PredictionSummary>,
    pub actual_home_scorers: Option<Vec<String>>,
    pub actual_away_scorers: Option<Vec<String>>,
    pub merge_info: MergeInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_sources: Option<DataSources>,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeStats {
    pub total: usize,
    pub predicted: usize,
    pub prediction_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub predicted: usize,
    pub unpredicted: usize,
    pub prediction_rate: f64,
    pub by_competition: BTreeMap<String, ScopeStats>,
    pub by_status: BTreeMap<String, ScopeStats>,
    pub upcoming_predictions: usize,
    pub completed_predictions: usize,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureIssue {
    pub index: usize,
    pub fixture_id: Option<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionIssue {
    pub index: usize,
    pub fixture_id: Option<String>,
    pub prediction_id: Option<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureWarning {
    pub index: usize,
    pub fixture_id: Option<String>,
    pub warnings: Vec<String>,
}

/// One prediction accepted by several fixtures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedPrediction {
    pub prediction_id: Option<String>,
    /// Output indices of every fixture that claimed the prediction.
    pub fixture_indices: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub total_fixtures: usize,
    pub valid_fixtures: usize,
    pub invalid_fixtures: usize,
    pub fixture_errors: Vec<FixtureIssue>,
    pub prediction_errors: Vec<PredictionIssue>,
    pub warnings: Vec<FixtureWarning>,
    pub prediction_warnings: Vec<FixtureWarning>,
    pub shared_predictions: Vec<SharedPrediction>,
}

// ---------------------------------------------------------------------------
// Orchestrator output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeMeta {
    pub total_fixtures: usize,
    pub predicted_fixtures: usize,
    pub prediction_rate: f64,
    pub processed_at: String,
    pub data_quality: f64,
    pub engine_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedData {
    pub fixtures: Vec<MergedFixture>,
    pub stats: Stats,
    pub validation: ValidationReport,
    pub meta: MergeMeta,
}

pub const DATA_MERGE_ERROR: &str = "DATA_MERGE_ERROR";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeFailure {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: String,
}

/// Outcome of [`crate::engine::process`]. Serializes as
/// `{"success": true, "data": ..}` or `{"success": false, "error": ..}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessResult {
    Success(MergedData),
    Failure(MergeFailure),
}

impl ProcessResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&MergedData> {
        match self {
            Self::Success(d) => Some(d),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&MergeFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(e) => Some(e),
        }
    }
}

impl Serialize for ProcessResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ProcessResult", 2)?;
        match self {
            Self::Success(data) => {
                s.serialize_field("success", &true)?;
                s.serialize_field("data", data)?;
            }
            Self::Failure(error) => {
                s.serialize_field("success", &false)?;
                s.serialize_field("error", error)?;
            }
        }
        s.end()
    }
}
