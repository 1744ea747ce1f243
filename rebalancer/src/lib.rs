//! sharebook-rebalancer: command-line front end for the sharebook rebalancer.
//!
//! Reads holdings and target allocations from JSON files, runs the
//! whole-share rebalance, and prints the resulting buy/sell list.

pub mod config;
pub mod error;
pub mod execution;
pub mod holdings;
pub mod target;
