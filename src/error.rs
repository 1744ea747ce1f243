//! Errors returned by rebalancing.

use crate::types::Ticker;

/// Reasons a rebalance request is rejected before any share math runs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RebalanceError {
    /// A target allocation names a ticker the ledger does not hold.
    #[error("could not find share price for ticker '{}'", .ticker.to_uppercase())]
    UnknownTicker { ticker: Ticker },

    /// Target allocations (after integer truncation) do not sum to 100, or a
    /// target is not a finite whole percentage. `total` saturates and leaves
    /// such targets out.
    #[error("target allocations must add up to 100% (got {total}%)")]
    InvalidAllocationSum { total: i64 },
}
