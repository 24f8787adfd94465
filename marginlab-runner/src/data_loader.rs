//! CSV bar/signal ingestion.
//!
//! Expected header: `date,open,high,low,close` plus either a sparse
//! `signal` column (crossover events, empty elsewhere) or a dense
//! `position_side` column (already-resolved holdings). When both are
//! present the resolved column wins.
//!
//! All data errors are rejected here, before the simulator runs: bad
//! dates or numbers carry the offending row number, and the date column
//! must be strictly increasing with no duplicates. The engine itself
//! assumes clean input.

use chrono::NaiveDate;
use marginlab_core::domain::{Bar, PositionSide};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bars plus whichever strategy column the file carried.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub bars: Vec<Bar>,
    pub positions: PositionColumn,
}

#[derive(Debug, Clone)]
pub enum PositionColumn {
    /// Dense, already-resolved per-bar sides.
    Resolved(Vec<PositionSide>),
    /// Sparse crossover signals for the position resolver.
    Signals(Vec<Option<PositionSide>>),
}

/// Errors from the ingestion layer. Row numbers refer to file lines
/// (the header is line 1).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}' (need date,open,high,low,close and signal or position_side)")]
    MissingColumn(&'static str),

    #[error("row {row}: unparseable date '{value}' (expected YYYY-MM-DD)")]
    BadDate { row: usize, value: String },

    #[error("row {row}: bad value '{value}' in column '{column}'")]
    BadNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: duplicate date {date}")]
    DuplicateDate { row: usize, date: NaiveDate },

    #[error("row {row}: date {date} is before preceding date {prev}")]
    OutOfOrder {
        row: usize,
        date: NaiveDate,
        prev: NaiveDate,
    },

    #[error("row {row}: '{value}' is not a valid side (expected -1, 0, or 1)")]
    BadSide { row: usize, value: String },

    #[error("no bars remain after applying the configured date range")]
    EmptyAfterFilter,
}

/// Load and validate one CSV series, keeping only bars inside
/// `[start, end]` (both inclusive, both optional).
pub fn load_series(
    path: &Path,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<LoadedSeries, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers()?.clone();
    let col = |name: &'static str| -> Result<usize, LoadError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn(name))
    };
    let date_col = col("date")?;
    let open_col = col("open")?;
    let high_col = col("high")?;
    let low_col = col("low")?;
    let close_col = col("close")?;
    let side_col = headers.iter().position(|h| h == "position_side");
    let signal_col = headers.iter().position(|h| h == "signal");
    if side_col.is_none() && signal_col.is_none() {
        return Err(LoadError::MissingColumn("signal or position_side"));
    }

    let mut bars = Vec::new();
    let mut sides = Vec::new();
    let mut signals = Vec::new();
    let mut prev_date: Option<NaiveDate> = None;

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 2; // header is line 1

        let date_text = record.get(date_col).unwrap_or("");
        let date =
            NaiveDate::parse_from_str(date_text, "%Y-%m-%d").map_err(|_| LoadError::BadDate {
                row,
                value: date_text.to_string(),
            })?;
        if let Some(prev) = prev_date {
            if date == prev {
                return Err(LoadError::DuplicateDate { row, date });
            }
            if date < prev {
                return Err(LoadError::OutOfOrder { row, date, prev });
            }
        }
        prev_date = Some(date);

        let price = |idx: usize, column: &'static str| -> Result<f64, LoadError> {
            let text = record.get(idx).unwrap_or("");
            let value: f64 = text.parse().map_err(|_| LoadError::BadNumber {
                row,
                column,
                value: text.to_string(),
            })?;
            if !value.is_finite() {
                return Err(LoadError::BadNumber {
                    row,
                    column,
                    value: text.to_string(),
                });
            }
            Ok(value)
        };

        let bar = Bar {
            date,
            open: price(open_col, "open")?,
            high: price(high_col, "high")?,
            low: price(low_col, "low")?,
            close: price(close_col, "close")?,
        };

        let parse_side = |idx: usize| -> Result<Option<PositionSide>, LoadError> {
            let text = record.get(idx).unwrap_or("").trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<i8>()
                .ok()
                .and_then(PositionSide::from_i8)
                .map(Some)
                .ok_or_else(|| LoadError::BadSide {
                    row,
                    value: text.to_string(),
                })
        };

        // The date filter runs after parsing so a bad row is reported even
        // when it falls outside the simulated window.
        let in_range = start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e);

        if let Some(idx) = side_col {
            // A dense column: an empty cell means flat, not absent.
            let side = parse_side(idx)?.unwrap_or(PositionSide::Flat);
            if in_range {
                sides.push(side);
            }
        } else if let Some(idx) = signal_col {
            let signal = parse_side(idx)?;
            if in_range {
                signals.push(signal);
            }
        }
        if in_range {
            bars.push(bar);
        }
    }

    if bars.is_empty() {
        return Err(LoadError::EmptyAfterFilter);
    }

    let positions = if side_col.is_some() {
        PositionColumn::Resolved(sides)
    } else {
        PositionColumn::Signals(signals)
    };
    Ok(LoadedSeries { bars, positions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const GOOD: &str = "\
date,open,high,low,close,signal
2023-01-03,100,101,99,100.5,
2023-01-04,100.5,102,100,101.5,1
2023-01-05,101.5,103,101,102.5,
";

    #[test]
    fn loads_signal_column() {
        let file = write_csv(GOOD);
        let series = load_series(file.path(), None, None).unwrap();
        assert_eq!(series.bars.len(), 3);
        assert_eq!(series.bars[0].close, 100.5);
        match series.positions {
            PositionColumn::Signals(signals) => {
                assert_eq!(signals, vec![None, Some(PositionSide::Long), None]);
            }
            PositionColumn::Resolved(_) => panic!("expected sparse signals"),
        }
    }

    #[test]
    fn loads_resolved_position_column() {
        let file = write_csv(
            "date,open,high,low,close,position_side\n\
             2023-01-03,100,101,99,100.5,0\n\
             2023-01-04,100.5,102,100,101.5,1\n",
        );
        let series = load_series(file.path(), None, None).unwrap();
        match series.positions {
            PositionColumn::Resolved(sides) => {
                assert_eq!(sides, vec![PositionSide::Flat, PositionSide::Long]);
            }
            PositionColumn::Signals(_) => panic!("expected resolved sides"),
        }
    }

    #[test]
    fn applies_date_filter() {
        let file = write_csv(GOOD);
        let start = NaiveDate::from_ymd_opt(2023, 1, 4).unwrap();
        let series = load_series(file.path(), Some(start), None).unwrap();
        assert_eq!(series.bars.len(), 2);
        assert_eq!(series.bars[0].date, start);
        match series.positions {
            PositionColumn::Signals(signals) => assert_eq!(signals.len(), 2),
            PositionColumn::Resolved(_) => panic!("expected sparse signals"),
        }
    }

    #[test]
    fn rejects_bad_date_with_row_number() {
        let file = write_csv(
            "date,open,high,low,close,signal\n\
             2023-01-03,100,101,99,100.5,\n\
             2023-02-30,101,102,100,101.5,\n",
        );
        let err = load_series(file.path(), None, None).unwrap_err();
        assert!(matches!(err, LoadError::BadDate { row: 3, .. }));
    }

    #[test]
    fn rejects_duplicate_and_out_of_order_dates() {
        let file = write_csv(
            "date,open,high,low,close,signal\n\
             2023-01-03,100,101,99,100.5,\n\
             2023-01-03,101,102,100,101.5,\n",
        );
        assert!(matches!(
            load_series(file.path(), None, None).unwrap_err(),
            LoadError::DuplicateDate { row: 3, .. }
        ));

        let file = write_csv(
            "date,open,high,low,close,signal\n\
             2023-01-04,100,101,99,100.5,\n\
             2023-01-03,101,102,100,101.5,\n",
        );
        assert!(matches!(
            load_series(file.path(), None, None).unwrap_err(),
            LoadError::OutOfOrder { row: 3, .. }
        ));
    }

    #[test]
    fn rejects_bad_price_and_bad_side() {
        let file = write_csv(
            "date,open,high,low,close,signal\n\
             2023-01-03,100,abc,99,100.5,\n",
        );
        assert!(matches!(
            load_series(file.path(), None, None).unwrap_err(),
            LoadError::BadNumber {
                row: 2,
                column: "high",
                ..
            }
        ));

        let file = write_csv(
            "date,open,high,low,close,signal\n\
             2023-01-03,100,101,99,100.5,2\n",
        );
        assert!(matches!(
            load_series(file.path(), None, None).unwrap_err(),
            LoadError::BadSide { row: 2, .. }
        ));
    }

    #[test]
    fn rejects_missing_strategy_column() {
        let file = write_csv("date,open,high,low,close\n2023-01-03,100,101,99,100.5\n");
        assert!(matches!(
            load_series(file.path(), None, None).unwrap_err(),
            LoadError::MissingColumn("signal or position_side")
        ));
    }

    #[test]
    fn rejects_empty_window() {
        let file = write_csv(GOOD);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            load_series(file.path(), Some(start), None).unwrap_err(),
            LoadError::EmptyAfterFilter
        ));
    }
}
