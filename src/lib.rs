// Allow our dollar.cents digit grouping convention (e.g., 100_00 = $100.00)
#![allow(clippy::inconsistent_digit_grouping)]

//! # sharebook
//!
//! A share investment ledger that values holdings and computes whole-share
//! rebalancing trades toward target allocation percentages.
//!
//! ## Features
//!
//! - **Case-insensitive tickers**: `AAPL` and `aapl` name the same holding
//! - **Fixed-point prices**: Integer cents throughout, decimals only at the view boundary
//! - **Memoized views**: Allocations and total value are cached until the next mutation
//! - **Whole-share sizing**: Each holding gets the most shares its target budget can buy
//! - **No-worse-off guard**: A plan that does not move closer to the targets yields no trades
//!
//! ## Quick Start
//!
//! ```
//! use sharebook::{InvestmentLedger, TargetAllocations};
//!
//! let mut ledger = InvestmentLedger::new();
//! ledger.save_investment("aapl", 6, 4.00);
//! ledger.save_investment("goog", 4, 2.00);
//!
//! assert_eq!(ledger.total_value(), 32.00);
//! assert_eq!(ledger.investments()[0].actual_allocation, 75.0);
//!
//! let targets = TargetAllocations::from_iter([("aapl", 50.0), ("goog", 50.0)]);
//! let trades = ledger.rebalance(&targets).unwrap();
//!
//! assert_eq!(trades[0].shares, -2); // sell 2 AAPL
//! assert_eq!(trades[1].shares, 4);  // buy 4 GOOG
//! ```
//!
//! ## Price Representation
//!
//! Prices are stored as [`i64`] cents:
//!
//! ```
//! use sharebook::Price;
//!
//! let price = Price::from_decimal(101.28);
//! assert_eq!(price, Price(101_28));
//! assert_eq!(format!("{}", price), "$101.28");
//! ```
//!
//! ## Validation
//!
//! Rebalancing fails before any sizing when a target names a ticker the
//! ledger does not hold, or when the targets (truncated to whole percents)
//! do not sum to exactly 100:
//!
//! ```
//! use sharebook::{InvestmentLedger, RebalanceError, TargetAllocations};
//!
//! let ledger = InvestmentLedger::new();
//! let err = ledger
//!     .rebalance(&TargetAllocations::from_iter([("aapl", 50.0)]))
//!     .unwrap_err();
//! assert!(matches!(err, RebalanceError::UnknownTicker { .. }));
//! assert!(err.to_string().contains("'AAPL'"));
//! ```

mod error;
mod ledger;
mod rebalance;
mod target;
mod types;

// Re-export public API
pub use error::RebalanceError;
pub use ledger::{InvestmentLedger, InvestmentView};
pub use rebalance::{PlanRow, RebalancePlan, Trade};
pub use target::TargetAllocations;
pub use types::{Price, Shares, Ticker, round2};
