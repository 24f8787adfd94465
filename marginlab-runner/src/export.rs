//! Output-table export.
//!
//! Writes the simulator's output as CSV: the input bar columns followed by
//! every account-snapshot column, one row per bar. Episode-scoped fields
//! that are `None` on flat bars become empty cells.

use std::path::Path;

use anyhow::{bail, Context, Result};
use marginlab_core::domain::{AccountSnapshot, Bar};

const HEADER: [&str; 17] = [
    "date",
    "open",
    "high",
    "low",
    "close",
    "position_side",
    "episode_start_date",
    "contract_num",
    "entry_price",
    "cash",
    "unrealized_profit",
    "net_value",
    "net_value_floor",
    "margin_ratio",
    "is_liquidated",
    "bar_return",
    "equity_index",
];

/// Render the output table as a CSV string.
pub fn export_csv(bars: &[Bar], snapshots: &[AccountSnapshot]) -> Result<String> {
    if bars.len() != snapshots.len() {
        bail!(
            "bar/snapshot length mismatch: {} bars vs {} snapshots",
            bars.len(),
            snapshots.len()
        );
    }

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(HEADER)?;

    let opt_num = |v: Option<f64>| v.map(|x| format!("{x:.6}")).unwrap_or_default();
    for (bar, snap) in bars.iter().zip(snapshots) {
        wtr.write_record([
            bar.date.to_string(),
            format!("{:.6}", bar.open),
            format!("{:.6}", bar.high),
            format!("{:.6}", bar.low),
            format!("{:.6}", bar.close),
            snap.position_side.as_i8().to_string(),
            snap.episode_start_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            snap.contract_num
                .map(|n| n.to_string())
                .unwrap_or_default(),
            opt_num(snap.entry_price),
            opt_num(snap.cash),
            opt_num(snap.unrealized_profit),
            opt_num(snap.net_value),
            opt_num(snap.net_value_floor),
            opt_num(snap.margin_ratio),
            (snap.is_liquidated as u8).to_string(),
            format!("{:.8}", snap.bar_return),
            format!("{:.8}", snap.equity_index),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// Write the output table to a file.
pub fn write_csv(path: &Path, bars: &[Bar], snapshots: &[AccountSnapshot]) -> Result<()> {
    let csv = export_csv(bars, snapshots)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}
