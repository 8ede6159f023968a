use chrono::{DateTime, Utc};

use crate::model::{Fixture, Prediction};

/// Anything carrying the three signals a canonical key is built from.
pub trait Keyed {
    fn home_name(&self) -> &str;
    fn away_name(&self) -> &str;
    fn kickoff(&self) -> Option<DateTime<Utc>>;

    /// `{home}_{away}_{YYYY-MM-DD}` with both names normalized.
    fn canonical_key(&self) -> String {
        fixture_key(self.home_name(), self.away_name(), self.kickoff())
    }
}

impl Keyed for Fixture {
    fn home_name(&self) -> &str {
        &self.home_team
    }
    fn away_name(&self) -> &str {
        &self.away_team
    }
    fn kickoff(&self) -> Option<DateTime<Utc>> {
        self.kickoff
    }
}

impl Keyed for Prediction {
    fn home_name(&self) -> &str {
        &self.home_team
    }
    fn away_name(&self) -> &str {
        &self.away_team
    }
    fn kickoff(&self) -> Option<DateTime<Utc>> {
        self.kickoff
    }
}

/// Lower-case, drop periods, whitespace runs become `_`, then keep only `[a-z0-9_]`.
pub fn normalize_team(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c == '.' {
            continue;
        }
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        for lc in c.to_lowercase() {
            if lc.is_ascii_lowercase() || lc.is_ascii_digit() || lc == '_' {
                out.push(lc);
            }
        }
    }
    out
}

/// Missing parts normalize to empty strings, which loosens the key.
pub fn fixture_key(home: &str, away: &str, kickoff: Option<DateTime<Utc>>) -> String {
    let date = kickoff
        .map(|k| k.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    format!("{}_{}_{}", normalize_team(home), normalize_team(away), date)
}
