//! `matchday merge`: reconcile a fixture list with user predictions.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use matchday_recon::adapter::parse_kickoff;
use matchday_recon::model::{MatchStatus, MergedData};
use matchday_recon::{
    parse_fixtures_json, parse_predictions_json, process, EngineConfig, FixtureFilter,
    ProcessOptions, ProcessResult,
};

use crate::exit_codes::{EXIT_MERGE_DATA_QUALITY, EXIT_MERGE_INVALID_CONFIG, EXIT_MERGE_RUNTIME};
use crate::export::format_merged_csv;
use crate::CliError;

#[derive(Subcommand)]
pub enum MergeCommands {
    /// Merge fixtures with predictions and report coverage
    #[command(after_help = "\
Fixtures may be a JSON array or an object wrapping one under
\"fixtures\", \"matches\" or \"data\"; predictions likewise under
\"predictions\" or \"data\".

Examples:
  matchday merge run --fixtures fixtures.json --predictions predictions.json
  matchday merge run --fixtures f.json --predictions p.json --json
  matchday merge run --fixtures f.json --predictions p.json --config engine.toml --predicted-only
  matchday merge run --fixtures f.json --predictions p.json --competition PL --from 2025-02-01 --csv gw24.csv
  matchday merge run --fixtures f.json --predictions p.json --strict")]
    Run {
        /// Fixture list (JSON)
        #[arg(long)]
        fixtures: PathBuf,

        /// Prediction list (JSON)
        #[arg(long)]
        predictions: PathBuf,

        /// Engine config (TOML): window, aliases, similarity, merge defaults
        #[arg(long, env = "MATCHDAY_CONFIG")]
        config: Option<PathBuf>,

        /// Drop fixtures without a prediction
        #[arg(long)]
        predicted_only: bool,

        /// Keep input order instead of sorting by kickoff
        #[arg(long)]
        no_sort: bool,

        /// Omit source / dataSources from merged records
        #[arg(long)]
        no_source: bool,

        /// Keep one competition (name substring or code, e.g. PL)
        #[arg(long)]
        competition: Option<String>,

        /// Keep one match status (e.g. SCHEDULED, FINISHED)
        #[arg(long)]
        status: Option<String>,

        /// Earliest kickoff to keep (inclusive)
        #[arg(long)]
        from: Option<String>,

        /// Latest kickoff to keep (inclusive)
        #[arg(long)]
        to: Option<String>,

        /// Keep fixtures involving this team (repeatable)
        #[arg(long)]
        team: Vec<String>,

        /// Keep one gameweek
        #[arg(long)]
        gameweek: Option<u32>,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write merged fixtures as CSV to file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit 62 when validation finds invalid records or shared predictions
        #[arg(long)]
        strict: bool,

        /// Fixed processing time (RFC 3339) for reproducible output
        #[arg(long, hide = true)]
        now: Option<String>,
    },

    /// Validate an engine config without running
    #[command(after_help = "\
Examples:
  matchday merge validate-config engine.toml")]
    ValidateConfig {
        /// Path to the engine TOML config
        config: PathBuf,
    },
}

pub fn cmd_merge(cmd: MergeCommands) -> Result<(), CliError> {
    match cmd {
        MergeCommands::Run {
            fixtures,
            predictions,
            config,
            predicted_only,
            no_sort,
            no_source,
            competition,
            status,
            from,
            to,
            team,
            gameweek,
            json,
            csv,
            output,
            strict,
            now,
        } => {
            let filter = FixtureFilter {
                competition,
                predicted: None,
                status: status.as_deref().map(MatchStatus::parse),
                date_from: from,
                date_to: to,
                teams: team,
                gameweek,
            };
            let args = RunArgs {
                fixtures,
                predictions,
                config,
                predicted_only,
                no_sort,
                no_source,
                filter,
                json,
                csv,
                output,
                strict,
                now,
            };
            cmd_merge_run(args)
        }
        MergeCommands::ValidateConfig { config } => cmd_merge_validate(config),
    }
}

struct RunArgs {
    fixtures: PathBuf,
    predictions: PathBuf,
    config: Option<PathBuf>,
    predicted_only: bool,
    no_sort: bool,
    no_source: bool,
    filter: FixtureFilter,
    json: bool,
    csv: Option<PathBuf>,
    output: Option<PathBuf>,
    strict: bool,
    now: Option<String>,
}

fn merge_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError::new(code, msg)
}

fn read_input(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::usage(format!("cannot read {}: {e}", path.display())))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let config_str = read_input(path)?;
    EngineConfig::from_toml(&config_str).map_err(|e| {
        merge_err(EXIT_MERGE_INVALID_CONFIG, format!("{}: {e}", path.display()))
            .with_hint(format!("check with: matchday merge validate-config {}", path.display()))
    })
}

fn cmd_merge_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;

    let fixtures = parse_fixtures_json(&read_input(&args.fixtures)?).map_err(|e| {
        merge_err(EXIT_MERGE_RUNTIME, format!("{}: {e}", args.fixtures.display()))
    })?;
    let predictions = parse_predictions_json(&read_input(&args.predictions)?).map_err(|e| {
        merge_err(EXIT_MERGE_RUNTIME, format!("{}: {e}", args.predictions.display()))
    })?;

    let now = match args.now.as_deref() {
        None => None,
        Some(s) => Some(parse_kickoff(s).ok_or_else(|| {
            CliError::usage(format!("--now: cannot parse date '{s}'"))
        })?),
    };

    let mut merge = config.merge;
    if args.predicted_only {
        merge.include_unpredicted = false;
    }
    if args.no_sort {
        merge.sort_by_date = false;
    }
    if args.no_source {
        merge.mark_source = false;
    }
    let options = ProcessOptions { merge, filter: args.filter, now };

    log::debug!(
        "merging {} fixtures with {} predictions (window {}h, {} alias entries)",
        fixtures.len(),
        predictions.len(),
        config.matching.window_hours,
        config.matching.aliases.len(),
    );

    let result = process(&fixtures, &predictions, &options, &config.matching);

    // Output
    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| merge_err(EXIT_MERGE_RUNTIME, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| merge_err(EXIT_MERGE_RUNTIME, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{json_str}");
    }

    let data = match result {
        ProcessResult::Success(data) => data,
        ProcessResult::Failure(failure) => {
            return Err(merge_err(
                EXIT_MERGE_RUNTIME,
                format!("{}: {}", failure.kind, failure.message),
            ));
        }
    };

    if let Some(ref path) = args.csv {
        let bytes = format_merged_csv(&data.fixtures)?;
        std::fs::write(path, bytes)
            .map_err(|e| merge_err(EXIT_MERGE_RUNTIME, format!("cannot write CSV: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    print_summary(&data);

    if args.strict && has_quality_issues(&data) {
        return Err(merge_err(EXIT_MERGE_DATA_QUALITY, "data quality issues found (--strict)"));
    }

    Ok(())
}

fn has_quality_issues(data: &MergedData) -> bool {
    let v = &data.validation;
    v.invalid_fixtures > 0 || !v.prediction_errors.is_empty() || !v.shared_predictions.is_empty()
}

/// Human summary to stderr; stdout stays reserved for `--json`.
fn print_summary(data: &MergedData) {
    let s = &data.stats;
    eprintln!(
        "merge: {} fixtures, {} predicted, {} unpredicted ({:.1}% coverage)",
        s.total, s.predicted, s.unpredicted, s.prediction_rate,
    );
    eprintln!(
        "predictions: {} upcoming, {} completed",
        s.upcoming_predictions, s.completed_predictions,
    );
    for (competition, scope) in &s.by_competition {
        eprintln!(
            "  {competition}: {}/{} ({:.1}%)",
            scope.predicted, scope.total, scope.prediction_rate,
        );
    }

    let v = &data.validation;
    eprintln!(
        "validation: {} valid, {} invalid fixtures, {} prediction errors, data quality {:.2}",
        v.valid_fixtures,
        v.invalid_fixtures,
        v.prediction_errors.len(),
        data.meta.data_quality,
    );
    for issue in &v.fixture_errors {
        eprintln!(
            "  fixture {} (#{}): {}",
            issue.fixture_id.as_deref().unwrap_or("?"),
            issue.index,
            issue.errors.join(", "),
        );
    }
    for shared in &v.shared_predictions {
        eprintln!(
            "  prediction {} matched fixtures {:?}",
            shared.prediction_id.as_deref().unwrap_or("?"),
            shared.fixture_indices,
        );
    }
}

fn cmd_merge_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = read_input(&config_path)?;

    match EngineConfig::from_toml(&config_str) {
        Ok(config) => {
            let similarity = match &config.matching.similarity {
                Some(sim) => format!("similarity threshold {}", sim.threshold),
                None => "similarity off".to_string(),
            };
            eprintln!(
                "valid: {}h window, {} alias entries, {}",
                config.matching.window_hours,
                config.matching.aliases.len(),
                similarity,
            );
            Ok(())
        }
        Err(e) => Err(merge_err(EXIT_MERGE_INVALID_CONFIG, e.to_string())),
    }
}
