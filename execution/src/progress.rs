//! Bracket progress aggregation.
//!
//! Groups a board's games by round and reports where the bracket stands. Pure
//! aggregation over the supplied games.

use serde::{Serialize, Serializer};
use squares_types::{Game, Round, RoundStats};
use std::collections::BTreeMap;

/// The round a bracket is currently playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurrentRound {
    /// No game is in progress or final yet.
    NotStarted,
    Round(Round),
}

impl CurrentRound {
    pub fn round(self) -> Option<Round> {
        match self {
            CurrentRound::NotStarted => None,
            CurrentRound::Round(round) => Some(round),
        }
    }
}

impl Serialize for CurrentRound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CurrentRound::NotStarted => serializer.serialize_str("not_started"),
            CurrentRound::Round(round) => round.serialize(serializer),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentProgress {
    pub current_round: CurrentRound,
    /// Rounds with at least one game, all of them final, in bracket order.
    pub completed_rounds: Vec<Round>,
    /// Rounds after the current round, in bracket order.
    pub upcoming_rounds: Vec<Round>,
    /// Counts for every round; rounds without games are zeroed.
    pub round_stats: BTreeMap<Round, RoundStats>,
}

impl TournamentProgress {
    pub fn stats(&self, round: Round) -> RoundStats {
        self.round_stats.get(&round).copied().unwrap_or_default()
    }

    /// True once the championship game is final.
    pub fn is_finished(&self) -> bool {
        self.stats(Round::Championship).is_complete()
    }
}

/// Summarizes bracket progress from every game of a board.
pub fn tournament_progress(games: &[Game]) -> TournamentProgress {
    let mut round_stats: BTreeMap<Round, RoundStats> = Round::ALL
        .iter()
        .map(|round| (*round, RoundStats::default()))
        .collect();
    for game in games {
        round_stats.entry(game.round).or_default().record(game.status);
    }

    let current_round = if round_stats.values().any(RoundStats::has_started) {
        round_stats
            .iter()
            .find(|(_, stats)| stats.completed < stats.total)
            .or_else(|| round_stats.iter().rev().find(|(_, stats)| stats.total > 0))
            .map(|(round, _)| CurrentRound::Round(*round))
            .unwrap_or(CurrentRound::NotStarted)
    } else {
        CurrentRound::NotStarted
    };

    let completed_rounds = round_stats
        .iter()
        .filter(|(_, stats)| stats.is_complete())
        .map(|(round, _)| *round)
        .collect();
    let upcoming_rounds = Round::ALL
        .iter()
        .copied()
        .filter(|round| match current_round {
            CurrentRound::NotStarted => true,
            CurrentRound::Round(current) => *round > current,
        })
        .collect();

    TournamentProgress {
        current_round,
        completed_rounds,
        upcoming_rounds,
        round_stats,
    }
}
