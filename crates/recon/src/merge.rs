use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::{MatchConfig, MergeOptions};
use crate::key::Keyed;
use crate::matcher::find_match;
use crate::model::{
    DataSources, Fixture, Match, MergeInfo, MergedFixture, Prediction, PredictionSummary,
};

pub const DEFAULT_FIXTURE_SOURCE: &str = "external-api";
pub const PREDICTION_SOURCE: &str = "backend-api";

/// Merge every fixture with its prediction (if any), stamping `merged_at` now.
pub fn merge_fixtures(
    fixtures: &[Fixture],
    predictions: &[Prediction],
    options: &MergeOptions,
    matching: &MatchConfig,
) -> Vec<MergedFixture> {
    merge_fixtures_at(fixtures, predictions, options, matching, Utc::now())
}

/// As [`merge_fixtures`] with an explicit merge timestamp.
///
/// O(fixtures x predictions). Inputs are only borrowed.
pub fn merge_fixtures_at(
    fixtures: &[Fixture],
    predictions: &[Prediction],
    options: &MergeOptions,
    matching: &MatchConfig,
    now: DateTime<Utc>,
) -> Vec<MergedFixture> {
    let merged_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut merged: Vec<MergedFixture> = fixtures
        .iter()
        .map(|fixture| {
            let found = find_match(fixture, predictions, matching);
            build_merged(fixture, found, options, &merged_at)
        })
        .filter(|m| options.include_unpredicted || m.predicted)
        .collect();

    if options.sort_by_date {
        // Stable: equal kickoffs keep input order, unknown kickoffs go last.
        merged.sort_by(|a, b| match (a.fixture.kickoff, b.fixture.kickoff) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }

    merged
}

fn build_merged(
    fixture: &Fixture,
    found: Option<Match<'_>>,
    options: &MergeOptions,
    merged_at: &str,
) -> MergedFixture {
    let prediction = found.map(|m| m.prediction);

    let (source, data_sources) = if options.mark_source {
        let fixture_source = fixture
            .source
            .clone()
            .unwrap_or_else(|| DEFAULT_FIXTURE_SOURCE.to_string());
        (
            Some(fixture_source.clone()),
            Some(DataSources {
                fixture: fixture_source,
                prediction: prediction.map(|_| PREDICTION_SOURCE.to_string()),
            }),
        )
    } else {
        (None, None)
    };

    MergedFixture {
        fixture: fixture.clone(),
        predicted: prediction.is_some(),
        user_prediction: prediction.map(PredictionSummary::from),
        actual_home_scorers: prediction.and_then(|p| p.actual_home_scorers.clone()),
        actual_away_scorers: prediction.and_then(|p| p.actual_away_scorers.clone()),
        merge_info: MergeInfo {
            prediction_matched: prediction.is_some(),
            fixture_key: fixture.canonical_key(),
            merged_at: merged_at.to_string(),
            matched_by: found.map(|m| m.tier),
            prediction_index: found.map(|m| m.index),
        },
        source,
        data_sources,
    }
}
