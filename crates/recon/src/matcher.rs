use chrono::{DateTime, Utc};
use strsim::jaro_winkler;

use crate::aliases::alias_form;
use crate::config::MatchConfig;
use crate::key::Keyed;
use crate::model::{Fixture, Match, MatchTier, Prediction};

/// Find the prediction for a fixture.
///
/// Predictions are tried in input order and the first one accepted by any of
/// tiers 1-4 wins; there is no ranking between plausible candidates. Only when
/// no prediction clears those tiers, and similarity matching is configured,
/// the best-scoring candidate above the threshold is taken.
pub fn find_match<'a>(
    fixture: &Fixture,
    predictions: &'a [Prediction],
    config: &MatchConfig,
) -> Option<Match<'a>> {
    let fixture_key = fixture.canonical_key();

    let found = predictions.iter().enumerate().find_map(|(index, prediction)| {
        match_tier(fixture, &fixture_key, prediction, config).map(|tier| Match {
            prediction,
            index,
            tier,
        })
    });

    let found = match found {
        Some(m) => Some(m),
        None => config
            .similarity
            .as_ref()
            .and_then(|sim| best_similar(fixture, predictions, config, sim.threshold)),
    };

    if let Some(ref m) = found {
        log::debug!(
            "fixture {} ({} v {}): prediction {} matched by {}",
            fixture.id.as_deref().unwrap_or("?"),
            fixture.home_team,
            fixture.away_team,
            m.prediction.id.as_deref().unwrap_or("?"),
            m.tier,
        );
    }
    found
}

/// First tier (1-4) at which `prediction` corresponds to `fixture`.
pub fn match_tier(
    fixture: &Fixture,
    fixture_key: &str,
    prediction: &Prediction,
    config: &MatchConfig,
) -> Option<MatchTier> {
    if let (Some(id), Some(match_id)) = (&fixture.id, &prediction.match_id) {
        if id == match_id {
            return Some(MatchTier::Identifier);
        }
    }

    if fixture_key == prediction.canonical_key() {
        return Some(MatchTier::Key);
    }

    if !within_window(fixture.kickoff, prediction.kickoff, config.window_secs()) {
        return None;
    }

    if partial_name_match(&fixture.home_team, &prediction.home_team)
        && partial_name_match(&fixture.away_team, &prediction.away_team)
    {
        return Some(MatchTier::Proximity);
    }

    if config.aliases.same_team(&fixture.home_team, &prediction.home_team)
        && config.aliases.same_team(&fixture.away_team, &prediction.away_team)
    {
        return Some(MatchTier::Alias);
    }

    None
}

/// Both kickoffs known and no more than `window_secs` apart.
fn within_window(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>, window_secs: i64) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).num_seconds().abs() <= window_secs,
        _ => false,
    }
}

/// Fixture name contains the prediction name's first word, case-insensitively.
/// A blank prediction name has no first word and never matches.
fn partial_name_match(fixture_name: &str, prediction_name: &str) -> bool {
    let prediction_lower = prediction_name.to_lowercase();
    match prediction_lower.split_whitespace().next() {
        Some(token) => fixture_name.to_lowercase().contains(token),
        None => false,
    }
}

fn best_similar<'a>(
    fixture: &Fixture,
    predictions: &'a [Prediction],
    config: &MatchConfig,
    threshold: f64,
) -> Option<Match<'a>> {
    let window = config.window_secs();
    let mut best: Option<(usize, f64)> = None;

    for (i, p) in predictions.iter().enumerate() {
        let (Some(fk), Some(pk)) = (fixture.kickoff, p.kickoff) else {
            continue;
        };
        let delta = (fk - pk).num_seconds().abs();
        if delta > window {
            continue;
        }
        let score = similarity_score(fixture, p, delta, window);
        if score >= threshold && best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }

    best.map(|(index, _)| Match {
        prediction: &predictions[index],
        index,
        tier: MatchTier::Similarity,
    })
}

/// 0.8 x mean Jaro-Winkler over both team names + 0.2 x time closeness.
pub fn similarity_score(
    fixture: &Fixture,
    prediction: &Prediction,
    delta_secs: i64,
    window_secs: i64,
) -> f64 {
    let home = jaro_winkler(&alias_form(&fixture.home_team), &alias_form(&prediction.home_team));
    let away = jaro_winkler(&alias_form(&fixture.away_team), &alias_form(&prediction.away_team));
    let closeness = if window_secs > 0 {
        1.0 - (delta_secs as f64 / window_secs as f64).min(1.0)
    } else {
        1.0
    };
    0.8 * (home + away) / 2.0 + 0.2 * closeness
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::parse_kickoff;
    use crate::aliases::AliasTable;
    use crate::config::SimilarityConfig;
    use crate::model::PredictionStatus;

    fn fixture(id: &str, home: &str, away: &str, date: &str) -> Fixture {
        Fixture {
            id: Some(id.into()),
            home_team: home.into(),
            away_team: away.into(),
            date: Some(date.into()),
            kickoff: parse_kickoff(date),
            status: None,
            venue: None,
            competition: None,
            competition_code: None,
            referee: None,
            gameweek: None,
            home_score: None,
            away_score: None,
            source: None,
            unreadable: vec![],
        }
    }

    fn prediction(
        id: &str,
        match_id: Option<&str>,
        home: &str,
        away: &str,
        date: &str,
    ) -> Prediction {
        Prediction {
            id: Some(id.into()),
            match_id: match_id.map(Into::into),
            home_team: home.into(),
            away_team: away.into(),
            date: Some(date.into()),
            kickoff: parse_kickoff(date),
            home_score: Some(1),
            away_score: Some(0),
            home_scorers: vec![],
            away_scorers: vec![],
            chips: vec![],
            submitted_at: None,
            status: PredictionStatus::Pending,
            actual_home_scorers: None,
            actual_away_scorers: None,
            unreadable: vec![],
        }
    }

    #[test]
    fn identifier_tier_ignores_names() {
        let f = fixture("1", "Man. City", "Chelsea", "2025-01-15T15:00:00Z");
        let preds = vec![prediction("10", Some("1"), "", "", "")];
        let m = find_match(&f, &preds, &MatchConfig::default()).unwrap();
        assert_eq!(m.tier, MatchTier::Identifier);
        assert_eq!(m.index, 0);
    }

    #[test]
    fn key_tier_is_case_and_punctuation_insensitive() {
        let f = fixture("1", "Man. City", "Chelsea", "2025-01-15T15:00:00Z");
        let preds = vec![prediction("10", None, "man city", "CHELSEA", "2025-01-15T20:00:00Z")];
        let m = find_match(&f, &preds, &MatchConfig::default()).unwrap();
        assert_eq!(m.tier, MatchTier::Key);
    }

    #[test]
    fn proximity_tier_uses_first_word() {
        let f = fixture("2", "Manchester United FC", "Newcastle United FC", "2025-03-01T12:30:00Z");
        let preds =
            vec![prediction("11", None, "Manchester Utd", "Newcastle", "2025-03-02T08:00:00Z")];
        let m = find_match(&f, &preds, &MatchConfig::default()).unwrap();
        assert_eq!(m.tier, MatchTier::Proximity);
    }

    #[test]
    fn alias_tier_resolves_both_sides() {
        let f = fixture("2", "Tottenham", "Liverpool", "2025-02-01T15:00:00Z");
        let preds = vec![prediction("11", None, "Spurs", "Liverpool", "2025-02-01T14:00:00Z")];
        let m = find_match(&f, &preds, &MatchConfig::default()).unwrap();
        assert_eq!(m.tier, MatchTier::Alias);
    }

    #[test]
    fn outside_window_no_match() {
        let f = fixture("2", "Tottenham", "Liverpool", "2025-02-01T15:00:00Z");
        let preds = vec![prediction("11", None, "Spurs", "Liverpool", "2025-02-02T15:00:01Z")];
        assert!(find_match(&f, &preds, &MatchConfig::default()).is_none());
    }

    #[test]
    fn exactly_24h_is_inside_window() {
        let f = fixture("2", "Tottenham", "Liverpool", "2025-02-01T15:00:00Z");
        let preds = vec![prediction("11", None, "Spurs", "Liverpool", "2025-02-02T15:00:00Z")];
        assert!(find_match(&f, &preds, &MatchConfig::default()).is_some());
    }

    #[test]
    fn blank_prediction_names_do_not_match_by_proximity() {
        let f = fixture("3", "Arsenal", "Chelsea", "2025-01-15T15:00:00Z");
        let preds = vec![prediction("12", None, "", "", "2025-01-15T15:00:00Z")];
        assert!(find_match(&f, &preds, &MatchConfig::default()).is_none());
    }

    #[test]
    fn first_match_wins_in_input_order() {
        let f = fixture("1", "Arsenal", "Chelsea", "2025-01-15T15:00:00Z");
        let preds = vec![
            prediction("20", None, "Arsenal", "Chelsea", "2025-01-15T18:00:00Z"),
            prediction("21", Some("1"), "Arsenal", "Chelsea", "2025-01-15T15:00:00Z"),
        ];
        let m = find_match(&f, &preds, &MatchConfig::default()).unwrap();
        assert_eq!(m.prediction.id.as_deref(), Some("20"));
        assert_eq!(m.tier, MatchTier::Key);
    }

    #[test]
    fn alias_table_is_injectable() {
        let f = fixture("4", "Inter", "Juventus", "2025-02-02T19:45:00Z");
        let preds = vec![prediction("13", None, "Internazionale", "Juve", "2025-02-02T19:45:00Z")];
        assert!(find_match(&f, &preds, &MatchConfig::default()).is_none());

        let mut map = std::collections::BTreeMap::new();
        map.insert("inter".to_string(), vec!["internazionale".to_string()]);
        map.insert("juventus".to_string(), vec!["juve".to_string()]);
        let config = MatchConfig {
            aliases: AliasTable::from_map(map).unwrap(),
            ..MatchConfig::default()
        };
        let m = find_match(&f, &preds, &config).unwrap();
        assert_eq!(m.tier, MatchTier::Alias);
    }

    #[test]
    fn similarity_fallback_picks_best_not_first() {
        let g = fixture("6", "Queens Park Rangers", "Middlesbrough", "2025-04-05T14:00:00Z");
        let preds = vec![
            prediction("32", None, "Q.P.R", "Boro", "2025-04-05T14:00:00Z"),
            prediction(
                "33",
                None,
                "Queen's Park Rangers",
                "Middlesbrough FC",
                "2025-04-05T15:00:00Z",
            ),
        ];
        assert!(find_match(&g, &preds, &MatchConfig::default()).is_none());

        let config = MatchConfig {
            similarity: Some(SimilarityConfig { threshold: 0.85 }),
            ..MatchConfig::default()
        };
        let m = find_match(&g, &preds, &config).unwrap();
        assert_eq!(m.tier, MatchTier::Similarity);
        assert_eq!(m.prediction.id.as_deref(), Some("33"));
    }

    #[test]
    fn similarity_respects_window() {
        let g = fixture("6", "Queens Park Rangers", "Middlesbrough", "2025-04-05T14:00:00Z");
        let preds = vec![prediction(
            "33",
            None,
            "Queen's Park Rangers",
            "Middlesbrough FC",
            "2025-04-09T15:00:00Z",
        )];
        let config = MatchConfig {
            similarity: Some(SimilarityConfig { threshold: 0.5 }),
            ..MatchConfig::default()
        };
        assert!(find_match(&g, &preds, &config).is_none());
    }
}
