use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use squares_execution::{
    resolve_board, run_assignment_json, run_resolution_json, tally_winnings, tournament_progress,
    ErrorKind, RandomSource, Resolution, SeededSource, SkippedGame, TournamentProgress,
    UserWinnings,
};
use squares_types::{BoardAssignment, Game, PayoutTable, PayoutTableError, Round};
use std::{collections::BTreeMap, fmt, path::Path, str::FromStr};
use thiserror::Error;
use tracing::Level;

/// Configuration for the `squares` binary (from config file).
#[derive(Deserialize, Serialize)]
pub struct Config {
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
    /// Fixed seed for reproducible assignment runs. Live boards leave this
    /// unset and draw from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Per-round payout amounts for the board.
    pub payouts: BTreeMap<Round, u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("invalid payout table")]
    InvalidPayouts(#[from] PayoutTableError),
}

pub struct ValidatedConfig {
    pub log_level: Level,
    pub json_logs: bool,
    pub seed: Option<u64>,
    pub payouts: PayoutTable,
}

impl fmt::Debug for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedConfig")
            .field("log_level", &self.log_level)
            .field("json_logs", &self.json_logs)
            .field("seed", &self.seed.map(|_| "<fixed>"))
            .field("payouts", &self.payouts)
            .finish()
    }
}

impl Config {
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let log_level = Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
            value: self.log_level.clone(),
        })?;
        let payouts = PayoutTable::new(self.payouts)?;
        Ok(ValidatedConfig {
            log_level,
            json_logs: self.json_logs,
            seed: self.seed,
            payouts,
        })
    }
}

/// Reads and validates a YAML config file.
pub fn load_config(path: &Path) -> Result<ValidatedConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("could not read config file {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&raw)
        .with_context(|| format!("could not parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config file {}", path.display()))
}

/// Installs the global `tracing` subscriber. Logs go to stderr so stdout stays
/// machine readable.
pub fn init_logging(level: Level, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Picks the randomness for an assignment run: an explicit seed wins over the
/// config seed, and with neither the run draws from OS entropy.
pub fn assignment_source(flag_seed: Option<u64>, config_seed: Option<u64>) -> SeededSource {
    match flag_seed.or(config_seed) {
        Some(seed) => SeededSource::from_seed(seed),
        None => SeededSource::from_entropy(),
    }
}

/// Every game and assignment of one board.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRequest {
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(default)]
    pub board_assignments: Vec<BoardAssignment>,
}

/// Board summary. `success` is false only when the board itself is malformed;
/// games with bad scores land in `skipped`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardReport {
    pub success: bool,
    pub progress: TournamentProgress,
    pub resolutions: Vec<Resolution>,
    pub skipped: Vec<SkippedGame>,
    pub winnings: Vec<UserWinnings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

pub fn assign<R: RandomSource + ?Sized>(input: &str, rng: &mut R) -> Result<String> {
    let outcome = run_assignment_json(input, rng);
    Ok(serde_json::to_string_pretty(&outcome)?)
}

pub fn resolve(input: &str, payouts: &PayoutTable) -> Result<String> {
    let outcome = run_resolution_json(input, payouts);
    Ok(serde_json::to_string_pretty(&outcome)?)
}

pub fn progress(input: &str) -> Result<String> {
    let games: Vec<Game> = serde_json::from_str(input).context("could not parse games")?;
    Ok(serde_json::to_string_pretty(&tournament_progress(&games))?)
}

pub fn board(input: &str, payouts: &PayoutTable) -> Result<String> {
    let request: BoardRequest =
        serde_json::from_str(input).context("could not parse board request")?;
    let progress = tournament_progress(&request.games);
    let report = match resolve_board(&request.games, &request.board_assignments, payouts) {
        Ok(resolved) => BoardReport {
            success: true,
            progress,
            winnings: tally_winnings(&resolved.resolutions),
            resolutions: resolved.resolutions,
            skipped: resolved.skipped,
            error: None,
            error_kind: None,
        },
        Err(err) => {
            tracing::error!(error = %err, "board could not be resolved");
            BoardReport {
                success: false,
                progress,
                resolutions: Vec::new(),
                skipped: Vec::new(),
                winnings: Vec::new(),
                error_kind: Some(ErrorKind::from(&err)),
                error: Some(err.to_string()),
            }
        }
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
