use chrono::{DateTime, Utc};

use crate::adapter::parse_kickoff;
use crate::error::ReconError;
use crate::model::{MatchStatus, MergedFixture};

/// Post-merge narrowing. Every criterion is optional; set ones are AND-ed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureFilter {
    /// Case-insensitive substring of the competition name, or exact competition code.
    pub competition: Option<String>,
    pub predicted: Option<bool>,
    pub status: Option<MatchStatus>,
    /// Inclusive lower kickoff bound, any format [`parse_kickoff`] accepts.
    pub date_from: Option<String>,
    /// Inclusive upper kickoff bound.
    pub date_to: Option<String>,
    /// Keep fixtures where any of these appears in the home or away name.
    pub teams: Vec<String>,
    pub gameweek: Option<u32>,
}

impl FixtureFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub fn filter_merged(
    merged: &[MergedFixture],
    filter: &FixtureFilter,
) -> Result<Vec<MergedFixture>, ReconError> {
    let from = parse_bound("date_from", filter.date_from.as_deref())?;
    let to = parse_bound("date_to", filter.date_to.as_deref())?;
    let competition = filter.competition.as_ref().map(|c| (c.to_lowercase(), c.as_str()));
    let teams: Vec<String> = filter.teams.iter().map(|t| t.to_lowercase()).collect();

    Ok(merged
        .iter()
        .filter(|m| {
            let f = &m.fixture;

            if let Some((needle, code)) = &competition {
                let by_name = f
                    .competition
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(needle.as_str()));
                let by_code = f.competition_code.as_deref() == Some(*code);
                if !by_name && !by_code {
                    return false;
                }
            }
            if filter.predicted.is_some_and(|p| p != m.predicted) {
                return false;
            }
            if filter.status.as_ref().is_some_and(|s| f.status.as_ref() != Some(s)) {
                return false;
            }
            // A fixture without a kickoff can't satisfy a date bound.
            if let Some(from) = from {
                if !f.kickoff.is_some_and(|k| k >= from) {
                    return false;
                }
            }
            if let Some(to) = to {
                if !f.kickoff.is_some_and(|k| k <= to) {
                    return false;
                }
            }
            if !teams.is_empty() {
                let home = f.home_team.to_lowercase();
                let away = f.away_team.to_lowercase();
                if !teams.iter().any(|t| home.contains(t.as_str()) || away.contains(t.as_str())) {
                    return false;
                }
            }
            if filter.gameweek.is_some_and(|gw| f.gameweek != Some(gw)) {
                return false;
            }
            true
        })
        .cloned()
        .collect())
}

fn parse_bound(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, ReconError> {
    match value {
        None => Ok(None),
        Some(v) => parse_kickoff(v).map(Some).ok_or_else(|| ReconError::DateParse {
            field: field.to_string(),
            value: v.to_string(),
        }),
    }
}
