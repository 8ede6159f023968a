use std::collections::BTreeMap;

use serde::Deserialize;

use crate::aliases::AliasTable;
use crate::error::ReconError;

pub const DEFAULT_WINDOW_HOURS: u32 = 24;
/// One week; anything wider stops being "the same match".
pub const MAX_WINDOW_HOURS: u32 = 168;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Everything the engine can be tuned with. `Default` is the stock behavior:
/// 24h proximity window, built-in alias table, no similarity fallback,
/// unpredicted fixtures kept, sorted by kickoff, sources marked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub matching: MatchConfig,
    pub merge: MergeOptions,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    /// Max kickoff distance for proximity, alias and similarity tiers.
    pub window_hours: u32,
    pub aliases: AliasTable,
    /// `Some` enables the scored fallback after tiers 1-4 fail.
    pub similarity: Option<SimilarityConfig>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            window_hours: DEFAULT_WINDOW_HOURS,
            aliases: AliasTable::default(),
            similarity: None,
        }
    }
}

impl MatchConfig {
    pub fn window_secs(&self) -> i64 {
        i64::from(self.window_hours) * 3600
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimilarityConfig {
    /// Minimum combined score in (0, 1].
    pub threshold: f64,
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeOptions {
    #[serde(default = "default_true")]
    pub include_unpredicted: bool,
    #[serde(default = "default_true")]
    pub sort_by_date: bool,
    /// Attach `source` / `dataSources` to each merged record.
    #[serde(default = "default_true")]
    pub mark_source: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            include_unpredicted: true,
            sort_by_date: true,
            mark_source: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// File shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    matching: MatchingSection,
    #[serde(default)]
    similarity: Option<SimilarityConfig>,
    #[serde(default)]
    merge: Option<MergeOptions>,
    #[serde(default)]
    aliases: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MatchingSection {
    #[serde(default = "default_window_hours")]
    window_hours: u32,
    /// Merge `[aliases]` into the built-in table instead of replacing it.
    #[serde(default)]
    extend_default_aliases: bool,
}

impl Default for MatchingSection {
    fn default() -> Self {
        Self {
            window_hours: DEFAULT_WINDOW_HOURS,
            extend_default_aliases: false,
        }
    }
}

fn default_window_hours() -> u32 {
    DEFAULT_WINDOW_HOURS
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl EngineConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let file: ConfigFile =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;

        let aliases = match file.aliases {
            None => AliasTable::default(),
            Some(map) if file.matching.extend_default_aliases => {
                let mut table = AliasTable::default();
                table.extend(map)?;
                table
            }
            Some(map) => AliasTable::from_map(map)?,
        };

        let config = EngineConfig {
            matching: MatchConfig {
                window_hours: file.matching.window_hours,
                aliases,
                similarity: file.similarity,
            },
            merge: file.merge.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let hours = self.matching.window_hours;
        if hours == 0 || hours > MAX_WINDOW_HOURS {
            return Err(ReconError::ConfigValidation(format!(
                "matching.window_hours must be between 1 and {MAX_WINDOW_HOURS}, got {hours}"
            )));
        }

        if let Some(sim) = &self.matching.similarity {
            if !(sim.threshold > 0.0 && sim.threshold <= 1.0) {
                return Err(ReconError::ConfigValidation(format!(
                    "similarity.threshold must be in (0, 1], got {}",
                    sim.threshold
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
