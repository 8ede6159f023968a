//! Flat CSV rendering of merged fixtures, one row per fixture.

use matchday_recon::model::PredictionStatus;
use matchday_recon::MergedFixture;

use crate::exit_codes::EXIT_MERGE_RUNTIME;
use crate::CliError;

const HEADER: [&str; 14] = [
    "id",
    "date",
    "home_team",
    "away_team",
    "competition",
    "status",
    "home_score",
    "away_score",
    "predicted",
    "matched_by",
    "prediction_id",
    "predicted_home",
    "predicted_away",
    "prediction_status",
];

pub fn format_merged_csv(fixtures: &[MergedFixture]) -> Result<Vec<u8>, CliError> {
    let io_err = |e: csv::Error| CliError::new(EXIT_MERGE_RUNTIME, format!("CSV write error: {e}"));
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(HEADER).map_err(io_err)?;

    for m in fixtures {
        let f = &m.fixture;
        let up = m.user_prediction.as_ref();
        let score = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_default();
        let predicted_score = |v: Option<i32>| v.map(|n| n.to_string()).unwrap_or_default();

        writer
            .write_record([
                f.id.clone().unwrap_or_default(),
                f.date.clone().unwrap_or_default(),
                f.home_team.clone(),
                f.away_team.clone(),
                f.competition.clone().unwrap_or_default(),
                f.status.as_ref().map(|s| s.as_str().to_string()).unwrap_or_default(),
                score(f.home_score),
                score(f.away_score),
                m.predicted.to_string(),
                m.merge_info.matched_by.map(|t| t.to_string()).unwrap_or_default(),
                up.and_then(|p| p.id.clone()).unwrap_or_default(),
                predicted_score(up.and_then(|p| p.home_score)),
                predicted_score(up.and_then(|p| p.away_score)),
                up.map(|p| match p.status {
                    PredictionStatus::Pending => "pending",
                    PredictionStatus::Scored => "scored",
                })
                .unwrap_or_default()
                .to_string(),
            ])
            .map_err(io_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| CliError::new(EXIT_MERGE_RUNTIME, format!("CSV write error: {e}")))
}
