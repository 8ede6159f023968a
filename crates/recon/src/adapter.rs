//! Source adapters: project the shapes fixture providers and the prediction
//! store actually send onto the normalized [`Fixture`] / [`Prediction`] types.
//!
//! The same field can arrive under several names (`homeTeam` / `home`,
//! `date` / `utcDate` / `matchDate`), ids can be numbers or strings, and
//! provider payloads nest team and competition names inside objects. All of
//! that is resolved here so the matcher only ever sees one record shape.
//!
//! Field values are read leniently: a score sent as `"2"` is still a score,
//! and a value that cannot be used at all is dropped and its field name kept
//! in `unreadable` for validation to report. Only a record that is not a JSON
//! object fails the batch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ReconError;
use crate::model::{Fixture, MatchStatus, Prediction, PredictionStatus};

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse a kickoff / match date. Accepts RFC 3339, a naive
/// `YYYY-MM-DDTHH:MM:SS` (taken as UTC) and a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_kickoff(value: &str) -> Option<DateTime<Utc>> {
    let v = value.trim();
    if v.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(v) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(v, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(v, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Lenient field reads
// ---------------------------------------------------------------------------

/// Reads loosely typed JSON fields, recording the name of every field that
/// was present but held nothing usable. A bad value never fails the record.
#[derive(Debug, Default)]
struct FieldReader {
    unreadable: Vec<String>,
}

impl FieldReader {
    fn flag(&mut self, field: &str) {
        if !self.unreadable.iter().any(|f| f == field) {
            self.unreadable.push(field.to_string());
        }
    }

    /// Strings and numbers as text; anything else is unreadable.
    fn text(&mut self, field: &str, value: Option<Value>) -> Option<String> {
        match value? {
            Value::Null => None,
            Value::String(s) => non_empty(s),
            Value::Number(n) => Some(n.to_string()),
            _ => {
                self.flag(field);
                None
            }
        }
    }

    /// Dates keep whatever text they arrived as, so an epoch number or a
    /// stray object still surfaces as an invalid date during validation.
    fn date(value: Option<Value>) -> Option<String> {
        match value? {
            Value::Null => None,
            Value::String(s) => non_empty(s),
            other => Some(other.to_string()),
        }
    }

    /// Whole numbers, numeric strings included. Out-of-range or
    /// non-numeric values are unreadable.
    fn number<T: TryFrom<i64>>(&mut self, field: &str, value: Option<Value>) -> Option<T> {
        let parsed = match value? {
            Value::Null => return None,
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) if s.trim().is_empty() => return None,
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        match parsed.and_then(|n| T::try_from(n).ok()) {
            Some(n) => Some(n),
            None => {
                self.flag(field);
                None
            }
        }
    }

    /// A list of names. Non-text entries are dropped and flag the field.
    fn list(&mut self, field: &str, value: Option<Value>) -> Option<Vec<String>> {
        let items = match value? {
            Value::Null => return None,
            Value::Array(items) => items,
            _ => {
                self.flag(field);
                return None;
            }
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Null => {}
                Value::String(s) => out.extend(non_empty(s)),
                Value::Number(n) => out.push(n.to_string()),
                _ => self.flag(field),
            }
        }
        Some(out)
    }

    /// A team given as a plain name or as a provider object
    /// (`shortName` preferred over `name`). The first usable candidate wins.
    fn team(&mut self, field: &str, candidates: [Option<Value>; 2]) -> String {
        let mut unusable = false;
        for value in candidates.into_iter().flatten() {
            let name = match value {
                Value::Null => None,
                Value::String(s) => non_empty(s),
                Value::Object(map) => ["shortName", "name"]
                    .iter()
                    .filter_map(|key| map.get(*key).and_then(Value::as_str))
                    .find_map(|s| non_empty(s.to_string())),
                _ => {
                    unusable = true;
                    None
                }
            };
            if let Some(name) = name {
                return name;
            }
        }
        if unusable {
            self.flag(field);
        }
        String::new()
    }

    /// Competition name plus the code nested in a provider object, if any.
    fn competition(&mut self, value: Option<Value>) -> (Option<String>, Option<String>) {
        match value {
            None | Some(Value::Null) => (None, None),
            Some(Value::String(s)) => (non_empty(s), None),
            Some(Value::Object(mut map)) => {
                let name = self.text("competition", map.remove("name"));
                let code = self.text("competition", map.remove("code"));
                (name, code)
            }
            Some(_) => {
                self.flag("competition");
                (None, None)
            }
        }
    }

    /// The main official from a provider `referees` list.
    fn referee(&mut self, value: Option<Value>) -> Option<String> {
        let officials = match value? {
            Value::Null => return None,
            Value::Array(officials) => officials,
            _ => {
                self.flag("referees");
                return None;
            }
        };
        officials
            .iter()
            .filter(|r| {
                r.get("type")
                    .and_then(Value::as_str)
                    .is_some_and(|k| k.eq_ignore_ascii_case("referee"))
            })
            .find_map(|r| r.get("name").and_then(Value::as_str))
            .and_then(|s| non_empty(s.to_string()))
    }
}

fn full_time(score: Option<&Value>, side: &str) -> Option<Value> {
    score.and_then(|s| s.get("fullTime")).and_then(|ft| ft.get(side)).cloned()
}

// ---------------------------------------------------------------------------
// Fixture source
// ---------------------------------------------------------------------------

/// A fixture as delivered by a provider (or by an upstream transform of one).
/// Every field is kept as raw JSON and read leniently in the conversion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawFixture {
    id: Option<Value>,
    home_team: Option<Value>,
    home: Option<Value>,
    away_team: Option<Value>,
    away: Option<Value>,
    date: Option<Value>,
    utc_date: Option<Value>,
    status: Option<Value>,
    venue: Option<Value>,
    competition: Option<Value>,
    competition_code: Option<Value>,
    referee: Option<Value>,
    referees: Option<Value>,
    gameweek: Option<Value>,
    matchday: Option<Value>,
    home_score: Option<Value>,
    away_score: Option<Value>,
    score: Option<Value>,
    source: Option<Value>,
}

impl From<RawFixture> for Fixture {
    fn from(raw: RawFixture) -> Self {
        let mut read = FieldReader::default();

        let date = FieldReader::date(raw.date).or_else(|| FieldReader::date(raw.utc_date));
        let kickoff = date.as_deref().and_then(parse_kickoff);

        let (competition, nested_code) = read.competition(raw.competition);
        let competition_code = read.text("competitionCode", raw.competition_code).or(nested_code);

        let referee = match read.text("referee", raw.referee) {
            Some(name) => Some(name),
            None => read.referee(raw.referees),
        };

        let gameweek = match read.number("gameweek", raw.gameweek) {
            Some(gw) => Some(gw),
            None => read.number("matchday", raw.matchday),
        };

        let score = raw.score.as_ref();
        let home_score = match read.number("homeScore", raw.home_score) {
            Some(n) => Some(n),
            None => read.number("homeScore", full_time(score, "home")),
        };
        let away_score = match read.number("awayScore", raw.away_score) {
            Some(n) => Some(n),
            None => read.number("awayScore", full_time(score, "away")),
        };

        Fixture {
            id: read.text("id", raw.id),
            home_team: read.team("homeTeam", [raw.home_team, raw.home]),
            away_team: read.team("awayTeam", [raw.away_team, raw.away]),
            date,
            kickoff,
            status: read.text("status", raw.status).map(|s| MatchStatus::parse(&s)),
            venue: read.text("venue", raw.venue),
            competition,
            competition_code,
            referee,
            gameweek,
            home_score,
            away_score,
            source: read.text("source", raw.source),
            unreadable: read.unreadable,
        }
    }
}

// ---------------------------------------------------------------------------
// Prediction store
// ---------------------------------------------------------------------------

/// A prediction as returned by the prediction store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPrediction {
    id: Option<Value>,
    match_id: Option<Value>,
    fixture_id: Option<Value>,
    home_team: Option<Value>,
    home: Option<Value>,
    away_team: Option<Value>,
    away: Option<Value>,
    match_date: Option<Value>,
    date: Option<Value>,
    home_score: Option<Value>,
    away_score: Option<Value>,
    home_scorers: Option<Value>,
    away_scorers: Option<Value>,
    chips: Option<Value>,
    submitted_at: Option<Value>,
    status: Option<Value>,
    actual_home_scorers: Option<Value>,
    actual_away_scorers: Option<Value>,
}

impl From<RawPrediction> for Prediction {
    fn from(raw: RawPrediction) -> Self {
        let mut read = FieldReader::default();

        let date = FieldReader::date(raw.match_date).or_else(|| FieldReader::date(raw.date));
        let kickoff = date.as_deref().and_then(parse_kickoff);

        let match_id = match read.text("matchId", raw.match_id) {
            Some(id) => Some(id),
            None => read.text("fixtureId", raw.fixture_id),
        };

        let mut chips: Vec<String> = Vec::new();
        for chip in read.list("chips", raw.chips).unwrap_or_default() {
            if !chips.contains(&chip) {
                chips.push(chip);
            }
        }

        Prediction {
            id: read.text("id", raw.id),
            match_id,
            home_team: read.team("homeTeam", [raw.home_team, raw.home]),
            away_team: read.team("awayTeam", [raw.away_team, raw.away]),
            date,
            kickoff,
            home_score: read.number("homeScore", raw.home_score),
            away_score: read.number("awayScore", raw.away_score),
            home_scorers: read.list("homeScorers", raw.home_scorers).unwrap_or_default(),
            away_scorers: read.list("awayScorers", raw.away_scorers).unwrap_or_default(),
            chips,
            submitted_at: read.text("submittedAt", raw.submitted_at),
            status: read
                .text("status", raw.status)
                .as_deref()
                .map(PredictionStatus::parse)
                .unwrap_or_default(),
            actual_home_scorers: read.list("actualHomeScorers", raw.actual_home_scorers),
            actual_away_scorers: read.list("actualAwayScorers", raw.actual_away_scorers),
            unreadable: read.unreadable,
        }
    }
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// Pull the record list out of a top-level array or an object wrapping one
/// under the first of `keys` present.
fn record_list(input: &str, keys: &[&str]) -> Result<Vec<Value>, ReconError> {
    let records = match serde_json::from_str::<Value>(input)? {
        Value::Array(records) => records,
        Value::Object(mut map) => match keys.iter().find_map(|key| map.remove(*key)) {
            Some(Value::Array(records)) => records,
            Some(_) => {
                return Err(ReconError::Json(format!("'{}' must be an array", keys.join("' / '"))))
            }
            None => {
                return Err(ReconError::Json(format!(
                    "expected an array or an object with '{}'",
                    keys.join("' / '")
                )))
            }
        },
        _ => return Err(ReconError::Json("expected an array of records".into())),
    };
    Ok(records)
}

/// Decode each record on its own so an error names the offending index.
fn decode_records<R, T>(records: Vec<Value>) -> Result<Vec<T>, ReconError>
where
    R: DeserializeOwned,
    T: From<R>,
{
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            if !record.is_object() {
                return Err(ReconError::Json(format!("record {index}: expected an object")));
            }
            serde_json::from_value::<R>(record)
                .map(T::from)
                .map_err(|e| ReconError::Json(format!("record {index}: {e}")))
        })
        .collect()
}

/// Decode a JSON array of fixtures, or an object wrapping one under
/// `fixtures` / `matches` / `data`.
pub fn parse_fixtures_json(input: &str) -> Result<Vec<Fixture>, ReconError> {
    let records = record_list(input, &["fixtures", "matches", "data"])?;
    decode_records::<RawFixture, Fixture>(records)
}

/// Decode a JSON array of predictions, or an object wrapping one under
/// `predictions` / `data`.
pub fn parse_predictions_json(input: &str) -> Result<Vec<Prediction>, ReconError> {
    let records = record_list(input, &["predictions", "data"])?;
    decode_records::<RawPrediction, Prediction>(records)
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == s.len() {
        Some(s)
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn kickoff_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 15, 15, 0, 0).unwrap();
        assert_eq!(parse_kickoff("2025-01-15T15:00:00Z"), Some(expected));
        assert_eq!(parse_kickoff("2025-01-15T16:00:00+01:00"), Some(expected));
        assert_eq!(parse_kickoff("2025-01-15T15:00:00"), Some(expected));
        assert_eq!(
            parse_kickoff("2025-01-15"),
            Some(Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_kickoff("next tuesday"), None);
        assert_eq!(parse_kickoff(""), None);
    }

    #[test]
    fn provider_shape_projects_nested_fields() {
        let json = r#"[{
            "id": 537785,
            "utcDate": "2025-02-01T15:00:00Z",
            "status": "TIMED",
            "matchday": 24,
            "homeTeam": {"id": 73, "name": "Tottenham Hotspur FC", "shortName": "Tottenham"},
            "awayTeam": {"id": 64, "name": "Liverpool FC"},
            "competition": {"name": "Premier League", "code": "PL"},
            "referees": [{"type": "VAR", "name": "A"}, {"type": "REFEREE", "name": "Anthony Taylor"}],
            "score": {"fullTime": {"home": null, "away": null}}
        }]"#;
        let fixtures = parse_fixtures_json(json).unwrap();
        let f = &fixtures[0];
        assert_eq!(f.id.as_deref(), Some("537785"));
        assert_eq!(f.home_team, "Tottenham");
        assert_eq!(f.away_team, "Liverpool FC");
        assert_eq!(f.status, Some(MatchStatus::Timed));
        assert_eq!(f.gameweek, Some(24));
        assert_eq!(f.competition.as_deref(), Some("Premier League"));
        assert_eq!(f.competition_code.as_deref(), Some("PL"));
        assert_eq!(f.referee.as_deref(), Some("Anthony Taylor"));
        assert!(f.kickoff.is_some());
        assert_eq!(f.home_score, None);
    }

    #[test]
    fn app_shape_with_both_aliases_present() {
        let json = r#"{"fixtures": [{
            "id": "7", "homeTeam": "Arsenal", "home": "Arsenal",
            "awayTeam": "Chelsea", "away": "Chelsea",
            "date": "2025-01-15T15:00:00Z", "venue": "  ", "competition": "Premier League"
        }]}"#;
        let fixtures = parse_fixtures_json(json).unwrap();
        assert_eq!(fixtures[0].home_team, "Arsenal");
        assert_eq!(fixtures[0].venue, None);
        assert_eq!(fixtures[0].competition.as_deref(), Some("Premier League"));
    }

    #[test]
    fn fixture_missing_date_keeps_record() {
        let fixtures = parse_fixtures_json(r#"[{"id": 3, "homeTeam": "Arsenal"}]"#).unwrap();
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].date, None);
        assert_eq!(fixtures[0].kickoff, None);
        assert_eq!(fixtures[0].away_team, "");
    }

    #[test]
    fn prediction_defaults_and_aliases() {
        let json = r#"[{
            "id": 11, "home": "Spurs", "away": "Liverpool",
            "date": "2025-02-01T14:00:00Z", "homeScore": 1, "awayScore": 1,
            "chips": ["doubleDown", "doubleDown", "wildcard"]
        }]"#;
        let preds = parse_predictions_json(json).unwrap();
        let p = &preds[0];
        assert_eq!(p.id.as_deref(), Some("11"));
        assert_eq!(p.match_id, None);
        assert_eq!(p.home_team, "Spurs");
        assert_eq!(p.status, PredictionStatus::Pending);
        assert_eq!(p.chips, vec!["doubleDown".to_string(), "wildcard".to_string()]);
        assert!(p.home_scorers.is_empty());
        assert_eq!(p.actual_home_scorers, None);
    }

    #[test]
    fn prediction_match_date_wins_over_date() {
        let json = r#"[{"matchId": "1", "matchDate": "2025-01-15T15:00:00Z", "date": "2020-01-01", "status": "SCORED"}]"#;
        let p = &parse_predictions_json(json).unwrap()[0];
        assert_eq!(p.match_id.as_deref(), Some("1"));
        assert_eq!(p.date.as_deref(), Some("2025-01-15T15:00:00Z"));
        assert_eq!(p.status, PredictionStatus::Scored);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_fixtures_json("{not json").unwrap_err();
        assert!(matches!(err, ReconError::Json(_)));
    }

    #[test]
    fn loosely_typed_fields_are_coerced() {
        let json = r#"[{
            "id": 9, "homeTeam": "Arsenal", "awayTeam": "Chelsea",
            "date": "2025-01-15T15:00:00Z", "gameweek": "21", "homeScore": 2.0, "awayScore": "1"
        }]"#;
        let f = &parse_fixtures_json(json).unwrap()[0];
        assert_eq!(f.gameweek, Some(21));
        assert_eq!(f.home_score, Some(2));
        assert_eq!(f.away_score, Some(1));
        assert!(f.unreadable.is_empty());

        let json = r#"[{"id": 1, "matchId": 9, "homeScore": "2", "awayScore": 0, "chips": ["x", 3]}]"#;
        let p = &parse_predictions_json(json).unwrap()[0];
        assert_eq!(p.home_score, Some(2));
        assert_eq!(p.chips, vec!["x".to_string(), "3".to_string()]);
    }

    #[test]
    fn unusable_values_are_recorded_not_fatal() {
        let json = r#"[
            {"id": 1, "homeTeam": "Arsenal", "awayTeam": "Chelsea", "date": 1736953200,
             "gameweek": "twenty", "venue": {"name": "Emirates"}, "homeScore": -1},
            {"id": 2, "homeTeam": 42, "awayTeam": "Leeds", "date": "2025-01-16"}
        ]"#;
        let fixtures = parse_fixtures_json(json).unwrap();
        assert_eq!(fixtures.len(), 2);

        let f = &fixtures[0];
        assert_eq!(f.date.as_deref(), Some("1736953200"));
        assert_eq!(f.kickoff, None);
        assert_eq!(f.gameweek, None);
        assert_eq!(f.venue, None);
        assert_eq!(f.home_score, None);
        assert_eq!(f.unreadable, vec!["gameweek", "homeScore", "venue"]);

        assert_eq!(fixtures[1].home_team, "");
        assert_eq!(fixtures[1].unreadable, vec!["homeTeam"]);

        let json = r#"[
            {"id": 1, "matchId": 1, "homeScore": 2, "awayScore": 1},
            {"id": 2, "matchId": 2, "homeScore": "two", "awayScore": 1, "chips": "wildcard"}
        ]"#;
        let preds = parse_predictions_json(json).unwrap();
        assert_eq!(preds.len(), 2);
        assert!(preds[0].unreadable.is_empty());
        assert_eq!(preds[1].home_score, None);
        assert!(preds[1].chips.is_empty());
        assert_eq!(preds[1].unreadable, vec!["chips", "homeScore"]);
    }

    #[test]
    fn non_object_record_names_its_index() {
        let err = parse_fixtures_json(r#"[{"id": 1}, {"id": 2}, 7]"#).unwrap_err();
        assert_eq!(err, ReconError::Json("record 2: expected an object".into()));

        let err = parse_predictions_json(r#"{"fixtures": []}"#).unwrap_err();
        assert!(err.to_string().contains("'predictions' / 'data'"), "{err}");
    }
}
