//! Structural checks over merged fixtures. Purely diagnostic: nothing is
//! dropped or changed, problems are only reported.

use std::collections::BTreeMap;

use crate::model::{
    Fixture, FixtureIssue, FixtureWarning, MergedFixture, PredictionIssue, PredictionSummary,
    SharedPrediction, ValidationReport,
};

/// Errors and warnings for one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordCheck {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl RecordCheck {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn check_fixture(fixture: &Fixture) -> RecordCheck {
    let mut check = RecordCheck::default();

    if fixture.id.is_none() {
        check.errors.push("Missing fixture ID".into());
    }
    if fixture.home_team.is_empty() {
        check.errors.push("Missing home team".into());
    }
    if fixture.away_team.is_empty() {
        check.errors.push("Missing away team".into());
    }
    match (&fixture.date, fixture.kickoff) {
        (None, _) => check.errors.push("Missing fixture date".into()),
        (Some(_), None) => check.errors.push("Invalid date format".into()),
        (Some(_), Some(_)) => {}
    }

    if fixture.venue.is_none() {
        check.warnings.push("Missing venue".into());
    }
    if fixture.competition.is_none() {
        check.warnings.push("Missing competition".into());
    }
    if fixture.referee.is_none() {
        check.warnings.push("Missing referee".into());
    }
    for field in &fixture.unreadable {
        check.warnings.push(format!("Unreadable {field}"));
    }

    check
}

pub fn check_prediction(prediction: &PredictionSummary) -> RecordCheck {
    let mut check = RecordCheck::default();

    if prediction.id.is_none() {
        check.errors.push("Missing prediction ID".into());
    }
    if prediction.home_team.is_empty() {
        check.errors.push("Missing home team".into());
    }
    if prediction.away_team.is_empty() {
        check.errors.push("Missing away team".into());
    }
    for (side, field, score) in [
        ("home", "homeScore", prediction.home_score),
        ("away", "awayScore", prediction.away_score),
    ] {
        match score {
            None if prediction.unreadable.iter().any(|f| f == field) => {
                check.errors.push(format!("Invalid {side} score"))
            }
            None => check.errors.push(format!("Missing {side} score")),
            Some(s) if s < 0 => check.errors.push(format!("Invalid {side} score (negative)")),
            Some(_) => {}
        }
    }

    if prediction.submitted_at.is_none() {
        check.warnings.push("Missing submission timestamp".into());
    }
    if prediction.home_scorers.is_empty() {
        check.warnings.push("Missing home scorers".into());
    }
    for field in &prediction.unreadable {
        if field != "homeScore" && field != "awayScore" {
            check.warnings.push(format!("Unreadable {field}"));
        }
    }

    check
}

pub fn validate_merged(merged: &[MergedFixture]) -> ValidationReport {
    let mut report = ValidationReport {
        total_fixtures: merged.len(),
        ..ValidationReport::default()
    };
    let mut claims: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

    for (index, m) in merged.iter().enumerate() {
        let fixture_id = m.fixture.id.clone();
        let check = check_fixture(&m.fixture);

        if check.is_valid() {
            report.valid_fixtures += 1;
        } else {
            report.invalid_fixtures += 1;
            report.fixture_errors.push(FixtureIssue {
                index,
                fixture_id: fixture_id.clone(),
                errors: check.errors,
            });
        }
        if !check.warnings.is_empty() {
            report.warnings.push(FixtureWarning {
                index,
                fixture_id: fixture_id.clone(),
                warnings: check.warnings,
            });
        }

        let Some(prediction) = m.user_prediction.as_ref().filter(|_| m.predicted) else {
            continue;
        };
        let pcheck = check_prediction(prediction);
        if !pcheck.is_valid() {
            report.prediction_errors.push(PredictionIssue {
                index,
                fixture_id: fixture_id.clone(),
                prediction_id: prediction.id.clone(),
                errors: pcheck.errors,
            });
        }
        if !pcheck.warnings.is_empty() {
            report.prediction_warnings.push(FixtureWarning {
                index,
                fixture_id,
                warnings: pcheck.warnings,
            });
        }
        if let Some(pi) = m.merge_info.prediction_index {
            claims.entry(pi).or_default().push(index);
        }
    }

    for fixture_indices in claims.into_values().filter(|v| v.len() > 1) {
        let prediction_id = fixture_indices
            .first()
            .and_then(|&i| merged[i].user_prediction.as_ref())
            .and_then(|p| p.id.clone());
        log::warn!(
            "prediction {} matched {} fixtures (indices {:?})",
            prediction_id.as_deref().unwrap_or("?"),
            fixture_indices.len(),
            fixture_indices,
        );
        report.shared_predictions.push(SharedPrediction {
            prediction_id,
            fixture_indices,
        });
    }

    report
}
