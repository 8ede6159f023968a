use std::collections::BTreeMap;

use crate::model::{MergedFixture, PredictionStatus, ScopeStats, Stats};

pub const UNKNOWN_COMPETITION: &str = "Unknown";
pub const UNKNOWN_STATUS: &str = "UNKNOWN";

/// `predicted / total * 100`, exactly 0 for an empty scope.
pub fn prediction_rate(predicted: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        predicted as f64 / total as f64 * 100.0
    }
}

/// Compute prediction coverage from merged fixtures in one pass.
pub fn compute_stats(merged: &[MergedFixture]) -> Stats {
    let mut by_competition: BTreeMap<String, ScopeStats> = BTreeMap::new();
    let mut by_status: BTreeMap<String, ScopeStats> = BTreeMap::new();
    let mut predicted = 0;
    let mut upcoming_predictions = 0;
    let mut completed_predictions = 0;

    for m in merged {
        if let Some(up) = &m.user_prediction {
            predicted += 1;
            match up.status {
                PredictionStatus::Pending => upcoming_predictions += 1,
                PredictionStatus::Scored => completed_predictions += 1,
            }
        }

        let competition = m
            .fixture
            .competition
            .clone()
            .unwrap_or_else(|| UNKNOWN_COMPETITION.to_string());
        bump(by_competition.entry(competition).or_default(), m.predicted);

        let status = m
            .fixture
            .status
            .as_ref()
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN_STATUS.to_string());
        bump(by_status.entry(status).or_default(), m.predicted);
    }

    for scope in by_competition.values_mut().chain(by_status.values_mut()) {
        scope.prediction_rate = prediction_rate(scope.predicted, scope.total);
    }

    let total = merged.len();
    Stats {
        total,
        predicted,
        unpredicted: total - predicted,
        prediction_rate: prediction_rate(predicted, total),
        by_competition,
        by_status,
        upcoming_predictions,
        completed_predictions,
    }
}

fn bump(scope: &mut ScopeStats, predicted: bool) {
    scope.total += 1;
    if predicted {
        scope.predicted += 1;
    }
}
