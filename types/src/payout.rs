use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::Round;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayoutTableError {
    #[error("payout missing for round {0}")]
    MissingRound(Round),
    #[error("payout for round {0} must be > 0")]
    ZeroPayout(Round),
}

/// Per-round payout amounts fixed when a board is created.
///
/// Every round carries a strictly positive amount, so lookups never fail once
/// a table exists. Payouts are keyed by round only, never by a game's position
/// in the schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Round, u64>", into = "BTreeMap<Round, u64>")]
pub struct PayoutTable {
    amounts: BTreeMap<Round, u64>,
}

impl PayoutTable {
    pub fn new(amounts: BTreeMap<Round, u64>) -> Result<Self, PayoutTableError> {
        for round in Round::ALL {
            match amounts.get(&round) {
                None => return Err(PayoutTableError::MissingRound(round)),
                Some(0) => return Err(PayoutTableError::ZeroPayout(round)),
                Some(_) => {}
            }
        }
        Ok(Self { amounts })
    }

    /// Builds a table from amounts listed in bracket order.
    pub fn from_amounts(amounts: [u64; 6]) -> Result<Self, PayoutTableError> {
        Self::new(Round::ALL.into_iter().zip(amounts).collect())
    }

    pub fn payout_for(&self, round: Round) -> u64 {
        // Presence is checked in `new`.
        self.amounts.get(&round).copied().unwrap_or_default()
    }

    /// What the board owes if every bracket game is paid once.
    pub fn total(&self) -> u64 {
        Round::ALL
            .iter()
            .map(|round| self.payout_for(*round).saturating_mul(u64::from(round.expected_games())))
            .fold(0u64, u64::saturating_add)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Round, u64)> + '_ {
        self.amounts.iter().map(|(round, amount)| (*round, *amount))
    }
}

impl TryFrom<BTreeMap<Round, u64>> for PayoutTable {
    type Error = PayoutTableError;

    fn try_from(amounts: BTreeMap<Round, u64>) -> Result<Self, Self::Error> {
        Self::new(amounts)
    }
}

impl From<PayoutTable> for BTreeMap<Round, u64> {
    fn from(table: PayoutTable) -> Self {
        table.amounts
    }
}
