use std::collections::BTreeMap;

use crate::error::ReconError;

/// Canonical team name → known alternative spellings.
///
/// Names are compared after [`alias_form`]: lower-case, no periods, single
/// spaces. A team name resolves to the entry whose canonical name or alias
/// appears in it as a whole-word run; the longest such term wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, Vec<String>>,
}

const DEFAULT_ALIASES: &[(&str, &[&str])] = &[
    ("arsenal", &["arsenal fc", "the gunners"]),
    ("aston villa", &["aston villa fc"]),
    ("bournemouth", &["afc bournemouth"]),
    ("brentford", &["brentford fc"]),
    ("brighton", &["brighton & hove albion", "brighton and hove albion", "brighton hove"]),
    ("chelsea", &["chelsea fc"]),
    ("crystal palace", &["crystal palace fc"]),
    ("everton", &["everton fc"]),
    ("fulham", &["fulham fc"]),
    ("liverpool", &["liverpool fc"]),
    ("manchester city", &["man city", "mancity", "man city fc"]),
    ("manchester united", &["man united", "man utd", "manchester utd", "man u"]),
    ("newcastle", &["newcastle united", "newcastle utd"]),
    ("nottingham forest", &["nott'm forest", "nottm forest"]),
    ("tottenham", &["tottenham hotspur", "spurs"]),
    ("west ham", &["west ham united", "west ham utd"]),
    ("wolves", &["wolverhampton", "wolverhampton wanderers"]),
];

impl Default for AliasTable {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        for (canonical, aliases) in DEFAULT_ALIASES {
            entries.insert(
                canonical.to_string(),
                aliases.iter().map(|a| a.to_string()).collect(),
            );
        }
        Self { entries }
    }
}

impl AliasTable {
    fn empty() -> Self {
        Self { entries: BTreeMap::new() }
    }

    /// Build from a canonical → aliases map, validating it.
    pub fn from_map(map: BTreeMap<String, Vec<String>>) -> Result<Self, ReconError> {
        let mut table = Self::empty();
        table.extend(map)?;
        Ok(table)
    }

    /// Add entries, merging aliases into any existing canonical entry.
    pub fn extend(&mut self, map: BTreeMap<String, Vec<String>>) -> Result<(), ReconError> {
        for (canonical, aliases) in map {
            let canonical_form = alias_form(&canonical);
            if canonical_form.is_empty() {
                return Err(ReconError::ConfigValidation(
                    "alias table: canonical team name is empty".into(),
                ));
            }
            let entry = self.entries.entry(canonical_form.clone()).or_default();
            for alias in aliases {
                let form = alias_form(&alias);
                if form.is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "alias table: empty alias for '{canonical_form}'"
                    )));
                }
                if form != canonical_form && !entry.contains(&form) {
                    entry.push(form);
                }
            }
        }
        self.check_unique()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical team a name refers to, if any.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let form = alias_form(name);
        if form.is_empty() {
            return None;
        }
        let padded = format!(" {form} ");

        let mut best: Option<(&str, usize)> = None;
        for (canonical, aliases) in &self.entries {
            for term in std::iter::once(canonical).chain(aliases.iter()) {
                let longer = term.len() > best.map_or(0, |(_, len)| len);
                if longer && padded.contains(&format!(" {term} ")) {
                    best = Some((canonical.as_str(), term.len()));
                }
            }
        }
        best.map(|(canonical, _)| canonical)
    }

    /// Both names resolve, and to the same canonical team.
    pub fn same_team(&self, a: &str, b: &str) -> bool {
        match (self.resolve(a), self.resolve(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// An alias may belong to at most one canonical team.
    fn check_unique(&self) -> Result<(), ReconError> {
        let mut owner: BTreeMap<&str, &str> = BTreeMap::new();
        for (canonical, aliases) in &self.entries {
            for term in std::iter::once(canonical).chain(aliases.iter()) {
                if let Some(prev) = owner.insert(term.as_str(), canonical.as_str()) {
                    if prev != canonical {
                        return Err(ReconError::ConfigValidation(format!(
                            "alias table: '{term}' is claimed by both '{prev}' and '{canonical}'"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Comparison form for alias lookup.
pub fn alias_form(name: &str) -> String {
    name.to_lowercase()
        .replace('.', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_resolves_common_names() {
        let t = AliasTable::default();
        assert_eq!(t.resolve("Spurs"), Some("tottenham"));
        assert_eq!(t.resolve("Tottenham Hotspur FC"), Some("tottenham"));
        assert_eq!(t.resolve("Man. City"), Some("manchester city"));
        assert_eq!(t.resolve("Man Utd"), Some("manchester united"));
        assert_eq!(t.resolve("Manchester United FC"), Some("manchester united"));
        assert_eq!(t.resolve("Real Madrid"), None);
        assert_eq!(t.resolve(""), None);
    }

    #[test]
    fn whole_word_match_only() {
        let t = AliasTable::default();
        assert_eq!(t.resolve("Villarreal"), None);
        assert_eq!(t.resolve("Aston Villa"), Some("aston villa"));
    }

    #[test]
    fn bare_place_words_do_not_resolve() {
        let t = AliasTable::default();
        assert_eq!(t.resolve("Forest Green Rovers"), None);
        assert_eq!(t.resolve("Villa Nova"), None);
        assert_eq!(t.resolve("Palace Athletic"), None);
        assert!(!t.same_team("Forest Green Rovers", "Nottingham Forest"));
        assert_eq!(t.resolve("Nott'm Forest"), Some("nottingham forest"));
        assert_eq!(t.resolve("Crystal Palace FC"), Some("crystal palace"));
    }

    #[test]
    fn same_team_requires_both_resolved() {
        let t = AliasTable::default();
        assert!(t.same_team("Spurs", "Tottenham"));
        assert!(!t.same_team("Spurs", "Arsenal"));
        assert!(!t.same_team("Real Madrid", "Real Madrid"));
    }

    #[test]
    fn injected_table_replaces_default() {
        let mut map = BTreeMap::new();
        map.insert(
            "Inter".to_string(),
            vec!["Internazionale".to_string(), "Inter Milan".to_string()],
        );
        let t = AliasTable::from_map(map).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.resolve("FC Internazionale Milano"), Some("inter"));
        assert_eq!(t.resolve("Spurs"), None);
    }

    #[test]
    fn alias_claimed_twice_is_rejected() {
        let mut map = BTreeMap::new();
        map.insert("manchester city".to_string(), vec!["man".to_string()]);
        map.insert("manchester united".to_string(), vec!["man".to_string()]);
        let err = AliasTable::from_map(map).unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn empty_alias_is_rejected() {
        let mut map = BTreeMap::new();
        map.insert("chelsea".to_string(), vec!["  ".to_string()]);
        assert!(AliasTable::from_map(map).is_err());
    }
}
