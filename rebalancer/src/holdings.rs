//! Holdings snapshot (holdings.json) loading and validation.

use std::path::Path;

use serde::Deserialize;
use sharebook::InvestmentLedger;

use crate::error::{Error, Result};

/// Current holdings as supplied by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct HoldingsFile {
    pub investments: Vec<Holding>,
}

/// One holding: ticker, whole shares owned, and unit price in currency.
#[derive(Debug, Clone, Deserialize)]
pub struct Holding {
    pub ticker: String,
    pub shares: i64,
    pub price: f64,
}

impl HoldingsFile {
    /// Load and validate a holdings.json file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::HoldingsRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parse from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self> {
        let file: HoldingsFile = serde_json::from_str(json)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<()> {
        for h in &self.investments {
            if h.ticker.trim().is_empty() {
                return Err(Error::Holdings("empty ticker".into()));
            }
            if !h.price.is_finite() {
                return Err(Error::Holdings(format!(
                    "price for {} is not a finite number",
                    h.ticker
                )));
            }
        }
        Ok(())
    }

    /// Build a ledger. A ticker listed twice keeps its last entry.
    pub fn to_ledger(&self) -> InvestmentLedger {
        self.investments
            .iter()
            .map(|h| (h.ticker.trim(), h.shares, h.price))
            .collect()
    }
}
