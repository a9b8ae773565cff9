//! Per-user totals across a board's resolved games.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::resolution::Resolution;

/// One row of a board's winnings table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWinnings {
    pub rank: u32,
    pub user_id: String,
    pub total: u64,
    pub wins: u32,
}

/// Sums paid amounts per user.
///
/// Rows are sorted by total descending, then user id, and ranked from 1.
/// Resolutions without a winner pay nobody and are ignored.
pub fn tally_winnings(resolutions: &[Resolution]) -> Vec<UserWinnings> {
    let mut totals: BTreeMap<&str, (u64, u32)> = BTreeMap::new();
    for resolution in resolutions {
        let Some(user_id) = resolution.winner_user_id.as_deref() else {
            continue;
        };
        let entry = totals.entry(user_id).or_default();
        entry.0 = entry.0.saturating_add(resolution.payout_amount);
        entry.1 += 1;
    }

    let mut entries: Vec<UserWinnings> = totals
        .into_iter()
        .map(|(user_id, (total, wins))| UserWinnings {
            rank: 0,
            user_id: user_id.to_string(),
            total,
            wins,
        })
        .collect();
    entries.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.user_id.cmp(&b.user_id)));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = (i + 1) as u32;
    }
    entries
}
