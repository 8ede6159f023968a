use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::{MatchConfig, MergeOptions};
use crate::error::ReconError;
use crate::filter::{filter_merged, FixtureFilter};
use crate::merge::merge_fixtures_at;
use crate::model::{
    Fixture, MergeFailure, MergeMeta, MergedData, Prediction, ProcessResult, DATA_MERGE_ERROR,
};
use crate::stats::compute_stats;
use crate::validate::validate_merged;

/// Per-call knobs for [`process`] / [`run`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOptions {
    pub merge: MergeOptions,
    /// Applied after merging, before stats and validation.
    pub filter: FixtureFilter,
    /// Clock override for `mergedAt` / `processedAt`; `None` uses the wall clock.
    pub now: Option<DateTime<Utc>>,
}

/// Merge, aggregate and validate. Any failure is returned, never partial output.
pub fn run(
    fixtures: &[Fixture],
    predictions: &[Prediction],
    options: &ProcessOptions,
    matching: &MatchConfig,
) -> Result<MergedData, ReconError> {
    let now = options.now.unwrap_or_else(Utc::now);

    let mut merged = merge_fixtures_at(fixtures, predictions, &options.merge, matching, now);
    if !options.filter.is_empty() {
        merged = filter_merged(&merged, &options.filter)?;
    }

    let stats = compute_stats(&merged);
    let validation = validate_merged(&merged);

    if validation.invalid_fixtures > 0 {
        log::warn!(
            "data validation: {} of {} fixtures invalid",
            validation.invalid_fixtures,
            validation.total_fixtures,
        );
    }

    let data_quality = if validation.total_fixtures == 0 {
        1.0
    } else {
        validation.valid_fixtures as f64 / validation.total_fixtures as f64
    };

    let meta = MergeMeta {
        total_fixtures: merged.len(),
        predicted_fixtures: stats.predicted,
        prediction_rate: stats.prediction_rate,
        processed_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        data_quality,
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    log::debug!(
        "merged {} fixtures with {} predictions: {} predicted ({:.1}%)",
        fixtures.len(),
        predictions.len(),
        stats.predicted,
        stats.prediction_rate,
    );

    Ok(MergedData {
        fixtures: merged,
        stats,
        validation,
        meta,
    })
}

/// [`run`] behind a failure boundary: errors and panics both come back as
/// `ProcessResult::Failure` tagged `DATA_MERGE_ERROR`.
pub fn process(
    fixtures: &[Fixture],
    predictions: &[Prediction],
    options: &ProcessOptions,
    matching: &MatchConfig,
) -> ProcessResult {
    guarded(options, || run(fixtures, predictions, options, matching))
}

/// Run `pipeline`, turning an error or a panic into a tagged failure.
fn guarded(
    options: &ProcessOptions,
    pipeline: impl FnOnce() -> Result<MergedData, ReconError>,
) -> ProcessResult {
    let message = match panic::catch_unwind(AssertUnwindSafe(pipeline)) {
        Ok(Ok(data)) => return ProcessResult::Success(data),
        Ok(Err(e)) => e.to_string(),
        Err(payload) => ReconError::Internal(panic_message(payload.as_ref())).to_string(),
    };

    log::error!("data merge failed: {message}");
    let timestamp = options
        .now
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    ProcessResult::Failure(MergeFailure {
        message,
        kind: DATA_MERGE_ERROR.to_string(),
        timestamp,
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "merge pipeline panicked".to_string()
    }
}
