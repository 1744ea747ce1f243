//! Investment ledger: holdings storage plus memoized valuation views.
//!
//! The ledger owns an insertion-ordered list of investments keyed by
//! case-normalized ticker. Reads go through two lazily computed caches
//! (per-investment views and total value); every mutation clears both.

use std::cell::OnceCell;

use rustc_hash::FxHashMap;

use crate::types::{Price, Shares, Ticker, round2};

/// A stored holding. Prices are kept in cents.
#[derive(Clone, Debug)]
struct Investment {
    ticker: Ticker,
    shares_owned: Shares,
    share_price: Price,
}

impl Investment {
    /// Market value in cents, saturating at the `i64` range.
    #[inline]
    fn market_value(&self) -> i64 {
        self.shares_owned.saturating_mul(self.share_price.0)
    }
}

/// Read-only view of one investment with its share of the portfolio.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InvestmentView {
    /// Lower-cased ticker
    pub ticker: Ticker,
    /// Whole shares held
    pub shares_owned: Shares,
    /// Unit price (cents); serialized as decimal `share_price`
    #[cfg_attr(
        feature = "serde",
        serde(rename = "share_price", with = "crate::types::price_decimal")
    )]
    pub price: Price,
    /// Percentage of total portfolio value, rounded to 2 decimals
    pub actual_allocation: f64,
}

impl InvestmentView {
    /// Unit price as decimal currency (2 decimals).
    #[inline]
    pub fn share_price(&self) -> f64 {
        self.price.to_decimal()
    }

    /// Market value in cents, saturating at the `i64` range.
    #[inline]
    pub fn market_value(&self) -> i64 {
        self.shares_owned.saturating_mul(self.price.0)
    }
}

/// A collection of share investments.
///
/// # Example
///
/// ```
/// use sharebook::InvestmentLedger;
///
/// let mut ledger = InvestmentLedger::new();
/// ledger.save_investment("aapl", 2, 5.50);
/// ledger.save_investment("goog", 3, 4.15);
/// assert_eq!(ledger.total_value(), 23.45);
///
/// // Re-saving under any case updates in place.
/// ledger.save_investment("AAPL", 4, 5.50);
/// assert_eq!(ledger.len(), 2);
/// ```
///
/// Caches use [`OnceCell`], so a ledger is `!Sync`: one owner at a time.
#[derive(Clone, Debug, Default)]
pub struct InvestmentLedger {
    /// Holdings in insertion order
    investments: Vec<Investment>,
    /// Ticker -> position in `investments`
    index: FxHashMap<Ticker, usize>,
    /// Memoized views, cleared on mutation
    views: OnceCell<Vec<InvestmentView>>,
    /// Memoized total value (cents), cleared on mutation
    total_value: OnceCell<Price>,
}

impl InvestmentLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    // === Mutation ===

    /// Add an investment, or replace shares and price of an existing one.
    ///
    /// `share_price` is decimal currency, converted to cents with
    /// [`Price::from_decimal`]. Any numeric input is accepted as given.
    pub fn save_investment(&mut self, ticker: &str, shares_owned: Shares, share_price: f64) {
        self.save_investment_cents(ticker, shares_owned, Price::from_decimal(share_price));
    }

    /// Same as [`save_investment`](Self::save_investment) with an exact price in cents.
    pub fn save_investment_cents(&mut self, ticker: &str, shares_owned: Shares, share_price: Price) {
        let ticker = Ticker::new(ticker);
        match self.index.get(&ticker) {
            Some(&i) => {
                let inv = &mut self.investments[i];
                inv.shares_owned = shares_owned;
                inv.share_price = share_price;
            }
            None => {
                self.index.insert(ticker.clone(), self.investments.len());
                self.investments.push(Investment {
                    ticker,
                    shares_owned,
                    share_price,
                });
            }
        }
        self.invalidate();
    }

    /// Remove the investment with this ticker (any case).
    ///
    /// Returns `false` and leaves the caches alone when nothing matched.
    pub fn delete_investment(&mut self, ticker: &str) -> bool {
        let Some(removed) = self.index.remove(&Ticker::new(ticker)) else {
            return false;
        };
        self.investments.remove(removed);
        for i in self.index.values_mut() {
            if *i > removed {
                *i -= 1;
            }
        }
        self.invalidate();
        true
    }

    // === Queries ===

    /// Views of all investments in insertion order.
    ///
    /// Computed on first call after a mutation, then served from cache.
    pub fn investments(&self) -> &[InvestmentView] {
        self.views.get_or_init(|| {
            let total = self.total_value_cents().0;
            self.investments
                .iter()
                .map(|inv| InvestmentView {
                    ticker: inv.ticker.clone(),
                    shares_owned: inv.shares_owned,
                    price: inv.share_price,
                    actual_allocation: allocation_pct(inv.market_value(), total),
                })
                .collect()
        })
    }

    /// View of a single investment, looked up case-insensitively.
    pub fn get(&self, ticker: &str) -> Option<&InvestmentView> {
        let i = *self.index.get(&Ticker::new(ticker))?;
        self.investments().get(i)
    }

    /// Total portfolio value (cents). Zero for an empty ledger.
    ///
    /// Values beyond the `i64` range saturate instead of wrapping.
    pub fn total_value_cents(&self) -> Price {
        *self.total_value.get_or_init(|| {
            Price(
                self.investments
                    .iter()
                    .map(Investment::market_value)
                    .fold(0, i64::saturating_add),
            )
        })
    }

    /// Total portfolio value as decimal currency (2 decimals).
    #[inline]
    pub fn total_value(&self) -> f64 {
        self.total_value_cents().to_decimal()
    }

    /// Number of investments held.
    #[inline]
    pub fn len(&self) -> usize {
        self.investments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.investments.is_empty()
    }

    // === Internal ===

    fn invalidate(&mut self) {
        self.views.take();
        self.total_value.take();
    }
}

/// `value / total` as a percentage rounded to 2 decimals; 0 when nothing is held.
pub(crate) fn allocation_pct(value_cents: i64, total_cents: i64) -> f64 {
    if total_cents == 0 {
        return 0.0;
    }
    round2(value_cents as f64 * 100.0 / total_cents as f64)
}

impl<T: AsRef<str>> Extend<(T, Shares, f64)> for InvestmentLedger {
    fn extend<I: IntoIterator<Item = (T, Shares, f64)>>(&mut self, iter: I) {
        for (ticker, shares, price) in iter {
            self.save_investment(ticker.as_ref(), shares, price);
        }
    }
}

impl<T: AsRef<str>> FromIterator<(T, Shares, f64)> for InvestmentLedger {
    fn from_iter<I: IntoIterator<Item = (T, Shares, f64)>>(iter: I) -> Self {
        let mut ledger = Self::new();
        ledger.extend(iter);
        ledger
    }
}
