//! Whole-share rebalancing toward target allocation percentages.
//!
//! Each holding is sized to the largest whole number of shares that fits
//! inside its target share of the current portfolio value. The resulting
//! plan is only accepted when it lands strictly closer to the targets than
//! the portfolio already is; otherwise no trades are suggested, because
//! whole-share rounding would almost always produce some churn.
//!
//! Offsets are compared in hundredths of a percent so the acceptance test
//! is exact.

use std::fmt;

use log::debug;

use crate::error::RebalanceError;
use crate::ledger::{InvestmentLedger, allocation_pct};
use crate::target::TargetAllocations;
use crate::types::{Price, Shares, Ticker};

/// A buy (positive) or sell (negative) of whole shares.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trade {
    pub ticker: Ticker,
    pub shares: Shares,
}

impl Trade {
    #[inline]
    pub fn is_buy(&self) -> bool {
        self.shares > 0
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = if self.is_buy() { "BUY" } else { "SELL" };
        write!(f, "{action} {} {}", self.shares.abs(), self.ticker.to_uppercase())
    }
}

/// One holding's line in a rebalance plan.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanRow {
    pub ticker: Ticker,
    /// Unit price (cents)
    pub price: Price,
    pub actual_shares: Shares,
    pub rebalanced_shares: Shares,
    /// Current percentage of portfolio value (2 decimals)
    pub actual_allocation: f64,
    /// Requested percentage, truncated to an integer
    pub target_allocation: i64,
    /// Percentage of the rebalanced portfolio value (2 decimals)
    pub rebalanced_allocation: f64,
}

impl PlanRow {
    /// Shares to buy (positive) or sell (negative).
    #[inline]
    pub fn delta(&self) -> Shares {
        self.rebalanced_shares.saturating_sub(self.actual_shares)
    }

    /// Value of the rebalanced holding (cents), saturating.
    #[inline]
    pub fn rebalanced_value(&self) -> i64 {
        self.rebalanced_shares.saturating_mul(self.price.0)
    }
}

/// Full result of sizing a ledger against target allocations.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebalancePlan {
    /// One row per holding, in ledger order
    pub rows: Vec<PlanRow>,
    /// Portfolio value before rebalancing (cents)
    pub actual_total: Price,
    /// Value of the rebalanced holdings (cents); never above `actual_total`
    /// when all prices and targets are non-negative
    pub rebalanced_total: Price,
    /// Sum of |target - actual| allocation, in percentage points
    pub actual_offset: f64,
    /// Sum of |target - rebalanced| allocation. `None` when the rebalanced
    /// portfolio is worth nothing and has no allocation to measure.
    pub rebalanced_offset: Option<f64>,
    /// Whether the rebalanced offset beats the actual offset
    pub accepted: bool,
}

impl RebalancePlan {
    /// Trades for every changed holding, or none if the plan was rejected.
    pub fn trades(&self) -> Vec<Trade> {
        if !self.accepted {
            return Vec::new();
        }
        self.rows
            .iter()
            .filter(|row| row.delta() != 0)
            .map(|row| Trade {
                ticker: row.ticker.clone(),
                shares: row.delta(),
            })
            .collect()
    }

    /// Value left unallocated by whole-share rounding (cents).
    pub fn residual_cash(&self) -> Price {
        Price(self.actual_total.0.saturating_sub(self.rebalanced_total.0))
    }
}

impl fmt::Display for RebalancePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "REBALANCE PLAN:")?;
        writeln!(
            f,
            "  {:8} {:>10} {:>8} {:>8} {:>7} {:>9} {:>9} {:>9}",
            "Ticker", "Price", "Shares", "Target", "Delta", "Actual%", "Target%", "New%"
        )?;
        for r in &self.rows {
            writeln!(
                f,
                "  {:8} {:>10} {:>8} {:>8} {:>+7} {:>8.2}% {:>8}% {:>8.2}%",
                r.ticker.to_uppercase(),
                r.price.to_string(),
                r.actual_shares,
                r.rebalanced_shares,
                r.delta(),
                r.actual_allocation,
                r.target_allocation,
                r.rebalanced_allocation,
            )?;
        }
        writeln!(
            f,
            "\n  Value: {} -> {} ({} residual)",
            self.actual_total,
            self.rebalanced_total,
            self.residual_cash()
        )?;
        match self.rebalanced_offset {
            Some(offset) => writeln!(
                f,
                "  Offset: {:.2} -> {:.2} ({})",
                self.actual_offset,
                offset,
                if self.accepted { "accepted" } else { "rejected" }
            )?,
            None => writeln!(f, "  Offset: {:.2} -> n/a (rejected)", self.actual_offset)?,
        }
        Ok(())
    }
}

impl InvestmentLedger {
    /// Compute the trades that move this ledger toward `targets`.
    ///
    /// Returns an empty list when the rebalanced portfolio would not be
    /// strictly closer to the targets than the current one.
    ///
    /// # Errors
    ///
    /// - [`RebalanceError::UnknownTicker`] if a target names a ticker not held.
    /// - [`RebalanceError::InvalidAllocationSum`] if targets do not sum to 100,
    ///   or any target is not a finite number.
    ///
    /// # Example
    ///
    /// ```
    /// use sharebook::{InvestmentLedger, TargetAllocations, Ticker, Trade};
    ///
    /// let mut ledger = InvestmentLedger::new();
    /// ledger.save_investment("aapl", 6, 4.0); // 75%
    /// ledger.save_investment("goog", 4, 2.0); // 25%
    ///
    /// let targets = TargetAllocations::from_iter([("AAPL", 50.0), ("GOOG", 50.0)]);
    /// let trades = ledger.rebalance(&targets).unwrap();
    /// assert_eq!(trades, vec![
    ///     Trade { ticker: Ticker::new("aapl"), shares: -2 },
    ///     Trade { ticker: Ticker::new("goog"), shares: 4 },
    /// ]);
    /// ```
    pub fn rebalance(&self, targets: &TargetAllocations) -> Result<Vec<Trade>, RebalanceError> {
        Ok(self.plan(targets)?.trades())
    }

    /// Size every holding against `targets` and report the full computation.
    ///
    /// Validation runs in a fixed order: unknown tickers first, then the
    /// allocation sum. Holdings without a target are sized to 0%.
    pub fn plan(&self, targets: &TargetAllocations) -> Result<RebalancePlan, RebalanceError> {
        let mut pending = targets.pending();
        let mut total_allocation = 0_i128;
        let mut all_whole = true;

        let mut rows: Vec<PlanRow> = self
            .investments()
            .iter()
            .map(|inv| {
                let target = match pending.take(&inv.ticker).map(truncate_percent) {
                    None => 0,
                    Some(Some(pct)) => pct,
                    Some(None) => {
                        all_whole = false;
                        0
                    }
                };
                total_allocation += i128::from(target);
                PlanRow {
                    ticker: inv.ticker.clone(),
                    price: inv.price,
                    actual_shares: inv.shares_owned,
                    rebalanced_shares: inv.shares_owned,
                    actual_allocation: inv.actual_allocation,
                    target_allocation: target,
                    rebalanced_allocation: 0.0,
                }
            })
            .collect();

        if let Some(ticker) = pending.first_remaining() {
            return Err(RebalanceError::UnknownTicker {
                ticker: ticker.clone(),
            });
        }
        if !all_whole || total_allocation != 100 {
            return Err(RebalanceError::InvalidAllocationSum {
                total: saturate(total_allocation),
            });
        }

        let actual_total = self.total_value_cents();

        let mut rebalanced_total = 0_i64;
        for row in &mut rows {
            if let Some(shares) = affordable_shares(actual_total.0, row.target_allocation, row.price.0)
            {
                row.rebalanced_shares = shares;
            }
            rebalanced_total = rebalanced_total.saturating_add(row.rebalanced_value());
        }

        let mut actual_offset = 0_i128;
        let mut rebalanced_offset = 0_i128;
        for row in &mut rows {
            row.rebalanced_allocation = allocation_pct(row.rebalanced_value(), rebalanced_total);
            let target = i128::from(row.target_allocation) * 100;
            actual_offset += (target - hundredths(row.actual_allocation)).abs();
            rebalanced_offset += (target - hundredths(row.rebalanced_allocation)).abs();
        }

        let rebalanced_offset = (rebalanced_total != 0).then_some(rebalanced_offset);
        let accepted = rebalanced_offset.is_some_and(|offset| offset < actual_offset);

        match rebalanced_offset {
            Some(offset) if !accepted => debug!(
                "rebalance rejected: offset {:.2} -> {:.2} is no improvement",
                actual_offset as f64 / 100.0,
                offset as f64 / 100.0
            ),
            None => debug!("rebalance rejected: rebalanced portfolio holds no value"),
            _ => debug!(
                "rebalance accepted: {} -> {}",
                actual_total,
                Price(rebalanced_total)
            ),
        }

        Ok(RebalancePlan {
            rows,
            actual_total,
            rebalanced_total: Price(rebalanced_total),
            actual_offset: actual_offset as f64 / 100.0,
            rebalanced_offset: rebalanced_offset.map(|o| o as f64 / 100.0),
            accepted,
        })
    }
}

/// Largest whole share count whose cost fits in `target_pct` of `total_cents`.
///
/// Floors toward negative infinity for any sign of price or total, and
/// saturates at the `Shares` range. `None` for a zero price, which cannot
/// be sized.
fn affordable_shares(total_cents: i64, target_pct: i64, price_cents: i64) -> Option<Shares> {
    if price_cents == 0 {
        return None;
    }
    let budget = i128::from(total_cents) * i128::from(target_pct);
    Some(saturate(floor_div(budget, 100 * i128::from(price_cents))))
}

/// Integer division rounding toward negative infinity.
fn floor_div(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && (a < 0) != (b < 0) { q - 1 } else { q }
}

/// Clamp to the `i64` range.
#[inline]
fn saturate(x: i128) -> i64 {
    i64::try_from(x).unwrap_or(if x < 0 { i64::MIN } else { i64::MAX })
}

/// Targets are whole percentages; fractions are dropped toward zero.
///
/// `None` when the value is not finite or its whole part does not fit in
/// an `i64`; such a target can never be part of a valid allocation.
fn truncate_percent(percent: f64) -> Option<i64> {
    let whole = percent.trunc();
    // i64::MIN is exactly -2^63; i64::MAX rounds up to 2^63 as f64.
    if whole.is_finite() && whole >= i64::MIN as f64 && whole < i64::MAX as f64 {
        Some(whole as i64)
    } else {
        None
    }
}

/// A 2-decimal percentage as an integer count of hundredths.
#[inline]
fn hundredths(pct: f64) -> i128 {
    (pct * 100.0).round() as i128
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(pairs: &[(&str, f64)]) -> TargetAllocations {
        pairs.iter().copied().collect()
    }

    #[test]
    fn affordable_shares_floors() {
        // $32.00 * 50% / $4.00 = 4
        assert_eq!(affordable_shares(32_00, 50, 4_00), Some(4));
        // $10.00 * 33% / $3.00 = 1.1
        assert_eq!(affordable_shares(10_00, 33, 3_00), Some(1));
        assert_eq!(affordable_shares(10_00, 0, 3_00), Some(0));
        assert_eq!(affordable_shares(10_00, 50, 0), None);
    }

    #[test]
    fn affordable_shares_floors_negative_quotients() {
        // $45.00 / -$5.00 = -9
        assert_eq!(affordable_shares(90_00, 50, -5_00), Some(-9));
        // $10.00 * 33% / -$3.00 = -1.1
        assert_eq!(affordable_shares(10_00, 33, -3_00), Some(-2));
        // -$10.00 * 33% / $3.00 = -1.1
        assert_eq!(affordable_shares(-10_00, 33, 3_00), Some(-2));
        // -$10.00 * 33% / -$3.00 = 1.1
        assert_eq!(affordable_shares(-10_00, 33, -3_00), Some(1));
    }

    #[test]
    fn affordable_shares_saturates() {
        assert_eq!(affordable_shares(i64::MAX, i64::MAX, 1), Some(i64::MAX));
        assert_eq!(affordable_shares(i64::MAX, i64::MAX, -1), Some(i64::MIN));
    }

    #[test]
    fn affordable_shares_no_overflow() {
        let shares = affordable_shares(i64::MAX / 2, 100, 1).unwrap();
        assert_eq!(shares, i64::MAX / 2);
    }

    #[test]
    fn truncates_fractional_targets() {
        assert_eq!(truncate_percent(33.9), Some(33));
        assert_eq!(truncate_percent(-0.5), Some(0));
        assert_eq!(truncate_percent(-12.7), Some(-12));
    }

    #[test]
    fn unrepresentable_targets_do_not_truncate() {
        assert_eq!(truncate_percent(f64::NAN), None);
        assert_eq!(truncate_percent(f64::INFINITY), None);
        assert_eq!(truncate_percent(f64::NEG_INFINITY), None);
        assert_eq!(truncate_percent(1e300), None);
        assert_eq!(truncate_percent(-1e300), None);
        assert_eq!(truncate_percent(i64::MIN as f64), Some(i64::MIN));
    }

    #[test]
    fn plan_rows_carry_sizing() {
        let mut ledger = InvestmentLedger::new();
        ledger.save_investment("aapl", 6, 4.0);
        ledger.save_investment("goog", 4, 2.0);

        let plan = ledger.plan(&targets(&[("aapl", 50.0), ("goog", 50.0)])).unwrap();
        assert!(plan.accepted);
        assert_eq!(plan.actual_total, Price(32_00));
        assert_eq!(plan.rebalanced_total, Price(32_00));
        assert_eq!(plan.actual_offset, 50.0);
        assert_eq!(plan.rebalanced_offset, Some(0.0));
        assert_eq!(plan.rows[0].rebalanced_shares, 4);
        assert_eq!(plan.rows[1].rebalanced_shares, 8);
        assert_eq!(plan.rows[1].rebalanced_allocation, 50.0);
        assert_eq!(plan.residual_cash(), Price::ZERO);
    }

    #[test]
    fn untargeted_holding_is_sold() {
        let mut ledger = InvestmentLedger::new();
        ledger.save_investment("aapl", 5, 10.0);
        ledger.save_investment("goog", 5, 10.0);

        let trades = ledger.rebalance(&targets(&[("goog", 100.0)])).unwrap();
        assert_eq!(
            trades,
            vec![
                Trade { ticker: Ticker::new("aapl"), shares: -5 },
                Trade { ticker: Ticker::new("goog"), shares: 5 },
            ]
        );
    }

    #[test]
    fn zero_value_plan_is_rejected() {
        let mut ledger = InvestmentLedger::new();
        ledger.save_investment("aapl", 0, 10.0);

        let plan = ledger.plan(&targets(&[("aapl", 100.0)])).unwrap();
        assert_eq!(plan.rebalanced_offset, None);
        assert!(!plan.accepted);
        assert!(plan.trades().is_empty());
    }

    #[test]
    fn unpriced_holding_keeps_its_shares() {
        let mut ledger = InvestmentLedger::new();
        ledger.save_investment("aapl", 10, 10.0);
        ledger.save_investment("free", 3, 0.0);

        let plan = ledger.plan(&targets(&[("aapl", 50.0), ("free", 50.0)])).unwrap();
        assert_eq!(plan.rows[1].rebalanced_shares, 3);
        assert_eq!(plan.rows[0].rebalanced_shares, 5);
        let trades = plan.trades();
        assert!(trades.iter().all(|t| t.ticker != "free"));
    }

    #[test]
    fn negative_price_is_sized_by_floor() {
        let mut ledger = InvestmentLedger::new();
        ledger.save_investment("a", 10, 10.0);
        ledger.save_investment("n", 2, -5.0);

        // Total $90.00; half is $45.00, or -9 shares at -$5.00.
        let plan = ledger.plan(&targets(&[("a", 50.0), ("n", 50.0)])).unwrap();
        assert_eq!(plan.rows[0].rebalanced_shares, 4);
        assert_eq!(plan.rows[1].rebalanced_shares, -9);
        assert_eq!(plan.rebalanced_total, Price(85_00));
    }

    #[test]
    fn huge_targets_are_an_invalid_sum() {
        let mut ledger = InvestmentLedger::new();
        ledger.save_investment("a", 1, 1.0);
        ledger.save_investment("b", 1, 1.0);

        let err = ledger.rebalance(&targets(&[("a", 1e300), ("b", 1e300)])).unwrap_err();
        assert!(matches!(err, RebalanceError::InvalidAllocationSum { .. }));

        // Opposite huge targets do not cancel out to 100.
        let err = ledger
            .rebalance(&targets(&[("a", 1e300), ("b", -1e300)]))
            .unwrap_err();
        assert!(matches!(err, RebalanceError::InvalidAllocationSum { .. }));
    }

    #[test]
    fn large_whole_targets_do_not_overflow() {
        let mut ledger = InvestmentLedger::new();
        ledger.save_investment("a", 1, 1.0);
        ledger.save_investment("b", 1, 1.0);
        ledger.save_investment("c", 1, 1.0);

        let big = (1_i64 << 62) as f64;
        let plan = ledger
            .plan(&targets(&[("a", big), ("b", -big), ("c", 100.0)]))
            .unwrap();
        assert_eq!(plan.rows[0].target_allocation, 1 << 62);
        assert_eq!(plan.rows[2].rebalanced_shares, 3);
        assert!(plan.actual_offset > 0.0);
    }

    #[test]
    fn non_finite_target_is_an_invalid_sum() {
        let mut ledger = InvestmentLedger::new();
        ledger.save_investment("a", 1, 1.0);
        ledger.save_investment("b", 1, 1.0);

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = ledger.rebalance(&targets(&[("a", 100.0), ("b", bad)])).unwrap_err();
            assert_eq!(err, RebalanceError::InvalidAllocationSum { total: 100 });
        }
    }

    #[test]
    fn trade_display() {
        let buy = Trade { ticker: Ticker::new("goog"), shares: 4 };
        let sell = Trade { ticker: Ticker::new("aapl"), shares: -2 };
        assert_eq!(buy.to_string(), "BUY 4 GOOG");
        assert_eq!(sell.to_string(), "SELL 2 AAPL");
    }

    #[test]
    fn plan_display() {
        let mut ledger = InvestmentLedger::new();
        ledger.save_investment("aapl", 6, 4.0);
        ledger.save_investment("goog", 4, 2.0);
        let plan = ledger.plan(&targets(&[("aapl", 50.0), ("goog", 50.0)])).unwrap();

        let s = plan.to_string();
        assert!(s.contains("AAPL"));
        assert!(s.contains("GOOG"));
        assert!(s.contains("accepted"));
    }
}
