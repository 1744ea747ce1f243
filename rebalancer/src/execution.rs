//! Command workflows: load holdings, size against targets, print results.
//!
//! Nothing here places orders. The trade list is the output; executing it
//! against a brokerage is the caller's job.

use log::{info, warn};
use sharebook::{InvestmentLedger, RebalancePlan, Trade};

use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::holdings::HoldingsFile;
use crate::target::TargetSpec;

/// Options for a rebalance run.
pub struct RunOptions {
    pub format: OutputFormat,
    pub target_file: String,
}

/// Load the configured holdings into a ledger.
pub fn load_ledger(config: &Config) -> Result<InvestmentLedger> {
    let path = config.holdings_path();
    let ledger = HoldingsFile::load(&path)?.to_ledger();
    info!(
        "Loaded {} holdings from {} ({} total)",
        ledger.len(),
        path.display(),
        ledger.total_value_cents()
    );
    Ok(ledger)
}

/// Compute and print the trades that move the holdings toward `target`.
pub fn run(config: &Config, target: &TargetSpec, opts: &RunOptions) -> Result<()> {
    let ledger = load_ledger(config)?;
    info!("Rebalancing against {}", opts.target_file);

    let plan = ledger.plan(&target.allocations())?;
    if !plan.accepted {
        warn!(
            "Rebalanced offset {} does not improve on current offset {:.2}; no trades",
            plan.rebalanced_offset
                .map_or_else(|| "n/a".to_string(), |o| format!("{o:.2}")),
            plan.actual_offset
        );
    }

    print!("{}", render_trades(&plan.trades(), opts.format)?);
    Ok(())
}

/// Print the full sizing table for `target`.
pub fn show_plan(config: &Config, target: &TargetSpec, format: OutputFormat) -> Result<()> {
    let ledger = load_ledger(config)?;
    let plan = ledger.plan(&target.allocations())?;
    print!("{}", render_plan(&plan, format)?);
    Ok(())
}

/// Print current holdings with their allocations.
pub fn show_positions(config: &Config, format: OutputFormat) -> Result<()> {
    let ledger = load_ledger(config)?;
    print!("{}", render_positions(&ledger, format)?);
    Ok(())
}

// === Rendering ===

pub fn render_trades(trades: &[Trade], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(trades)?)),
        OutputFormat::Table => {
            if trades.is_empty() {
                return Ok("No rebalancing needed.\n".into());
            }
            let mut out = String::from("TRADES:\n");
            for (i, trade) in trades.iter().enumerate() {
                out.push_str(&format!("  {:>3}  {trade}\n", i + 1));
            }
            Ok(out)
        }
    }
}

pub fn render_plan(plan: &RebalancePlan, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(plan)?)),
        OutputFormat::Table => Ok(plan.to_string()),
    }
}

pub fn render_positions(ledger: &InvestmentLedger, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(format!(
            "{}\n",
            serde_json::to_string_pretty(&serde_json::json!({
                "investments": ledger.investments(),
                "total_value": ledger.total_value(),
            }))?
        )),
        OutputFormat::Table => {
            if ledger.is_empty() {
                return Ok("No holdings.\n".into());
            }
            let mut out = String::from("CURRENT PORTFOLIO:\n");
            for view in ledger.investments() {
                out.push_str(&format!(
                    "  {:8} {:>6} @ {:>10} = {:>12}  ({:.2}%)\n",
                    view.ticker.to_uppercase(),
                    view.shares_owned,
                    view.price.to_string(),
                    sharebook::Price(view.market_value()).to_string(),
                    view.actual_allocation,
                ));
            }
            out.push_str(&format!("\n  Total: {}\n", ledger.total_value_cents()));
            Ok(out)
        }
    }
}
