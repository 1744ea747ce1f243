//! Target allocation file (target.json) loading and validation.

use std::path::Path;

use rustc_hash::FxHashSet;
use serde::Deserialize;
use sharebook::TargetAllocations;

use crate::error::{Error, Result};

/// Desired allocation of the portfolio, in percent.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetSpec {
    pub targets: Vec<TargetPosition>,
}

/// A single target: ticker + percentage (50 means 50%).
#[derive(Debug, Clone, Deserialize)]
pub struct TargetPosition {
    pub ticker: String,
    pub allocation: f64,
}

impl TargetSpec {
    /// Load and validate a target.json file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::TargetRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parse from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: TargetSpec = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// File-level checks only. Matching against holdings and the 100% sum
    /// are left to the rebalancer so its errors surface unchanged.
    fn validate(&self) -> Result<()> {
        let mut seen = FxHashSet::default();
        for t in &self.targets {
            if t.ticker.trim().is_empty() {
                return Err(Error::Target("empty ticker".into()));
            }
            if !seen.insert(t.ticker.trim().to_lowercase()) {
                return Err(Error::Target(format!("duplicate ticker: {}", t.ticker)));
            }
            if !t.allocation.is_finite() {
                return Err(Error::Target(format!(
                    "allocation for {} is not a finite number",
                    t.ticker
                )));
            }
        }
        Ok(())
    }

    /// Targets in file order for the rebalancer.
    pub fn allocations(&self) -> TargetAllocations {
        self.targets
            .iter()
            .map(|t| (t.ticker.trim(), t.allocation))
            .collect()
    }
}
