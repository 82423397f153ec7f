//! Aggregate trade statistics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Trade;

/// Summary figures over a set of trades.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeStats {
    pub count: usize,
    pub pnl_sum: Decimal,
    pub winners: usize,
    pub losers: usize,
}

impl TradeStats {
    pub fn from_pnls<I>(pnls: I) -> Self
    where
        I: IntoIterator<Item = Decimal>,
    {
        pnls.into_iter().fold(TradeStats::default(), |mut acc, pnl| {
            acc.count += 1;
            acc.pnl_sum += pnl;
            if pnl > Decimal::ZERO {
                acc.winners += 1;
            } else if pnl < Decimal::ZERO {
                acc.losers += 1;
            }
            acc
        })
    }

    pub fn from_trades(trades: &[Trade]) -> Self {
        Self::from_pnls(trades.iter().map(|t| t.pnl))
    }

    /// Share of winning trades among decided (non-flat) trades.
    pub fn win_rate(&self) -> Option<Decimal> {
        let decided = self.winners + self.losers;
        if decided == 0 {
            return None;
        }
        Some(Decimal::from(self.winners as u64) / Decimal::from(decided as u64))
    }

    /// True when both sides hold the same number of trades and their PnL
    /// sums differ by at most `epsilon`.
    pub fn matches(&self, other: &TradeStats, epsilon: Decimal) -> bool {
        self.count == other.count && (self.pnl_sum - other.pnl_sum).abs() <= epsilon
    }
}
