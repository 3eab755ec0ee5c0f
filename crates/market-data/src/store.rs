//! Wide price table ingestion.
//!
//! Reads a `Date` column plus one price column per symbol, drops empty days,
//! orders by date and fills gaps forward then backward. Every failure mode
//! yields an empty matrix.

use analysis_core::{PriceMatrix, PriceRow};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};

pub const DATE_COLUMN: &str = "Date";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// File-backed market data store. The matrix is rebuilt on every `load`.
#[derive(Debug, Clone)]
pub struct TimeSeriesStore {
    path: PathBuf,
}

impl TimeSeriesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and normalize the price table. Missing or unreadable files give
    /// an empty matrix.
    pub fn load(&self) -> PriceMatrix {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                let matrix = parse_price_table(&text);
                tracing::debug!(
                    "Loaded {} rows x {} symbols from {}",
                    matrix.len(),
                    matrix.symbols().len(),
                    self.path.display()
                );
                matrix
            }
            Err(e) => {
                tracing::warn!("Market data unavailable at {}: {}", self.path.display(), e);
                PriceMatrix::empty()
            }
        }
    }

    /// Same pipeline as [`load`](Self::load) over in-memory CSV text.
    pub fn from_csv_str(text: &str) -> PriceMatrix {
        parse_price_table(text)
    }
}

/// Parse and normalize CSV text into a dense matrix.
pub fn parse_price_table(text: &str) -> PriceMatrix {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            tracing::warn!("Malformed market data header: {}", e);
            return PriceMatrix::empty();
        }
    };

    let Some(date_idx) = headers.iter().position(|h| h == DATE_COLUMN) else {
        tracing::warn!("Market data has no '{}' column", DATE_COLUMN);
        return PriceMatrix::empty();
    };

    // (csv column index, symbol); blank and repeated headers are ignored
    let mut columns: Vec<(usize, String)> = Vec::new();
    for (i, name) in headers.iter().enumerate() {
        if i == date_idx || name.is_empty() || columns.iter().any(|(_, s)| s == name) {
            continue;
        }
        columns.push((i, name.to_string()));
    }

    let mut raw: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        let Some(date) = record.get(date_idx).and_then(parse_date) else {
            skipped += 1;
            continue;
        };
        let values: Vec<Option<f64>> = columns
            .iter()
            .map(|(i, _)| record.get(*i).and_then(parse_price))
            .collect();
        if values.iter().all(Option::is_none) {
            continue;
        }
        raw.push((date, values));
    }
    if skipped > 0 {
        tracing::debug!("Skipped {} unreadable market data rows", skipped);
    }

    let symbols: Vec<String> = columns.into_iter().map(|(_, s)| s).collect();
    normalize(symbols, raw)
}

/// Sort, collapse duplicate dates, fill gaps and build the matrix.
fn normalize(symbols: Vec<String>, mut raw: Vec<(NaiveDate, Vec<Option<f64>>)>) -> PriceMatrix {
    raw.sort_by_key(|(date, _)| *date);

    let mut deduped: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::with_capacity(raw.len());
    for (date, values) in raw {
        match deduped.last_mut() {
            Some(last) if last.0 == date => last.1 = values,
            _ => deduped.push((date, values)),
        }
    }

    let width = symbols.len();
    let mut columns: Vec<Vec<Option<f64>>> = (0..width)
        .map(|c| deduped.iter().map(|(_, v)| v[c]).collect())
        .collect();
    for column in &mut columns {
        fill_forward_then_backward(column);
    }

    let keep: Vec<usize> = (0..width)
        .filter(|&c| columns[c].iter().all(Option::is_some))
        .collect();
    if keep.len() < width {
        tracing::debug!("Dropped {} symbol columns with no prices", width - keep.len());
    }

    let kept_symbols: Vec<String> = keep.iter().map(|&c| symbols[c].clone()).collect();
    let rows: Vec<PriceRow> = deduped
        .iter()
        .enumerate()
        .map(|(r, (date, _))| PriceRow {
            date: *date,
            prices: keep.iter().map(|&c| columns[c][r].unwrap_or(f64::NAN)).collect(),
        })
        .collect();

    if rows.is_empty() || kept_symbols.is_empty() {
        return PriceMatrix::empty();
    }

    match PriceMatrix::new(kept_symbols, rows) {
        Ok(matrix) => matrix,
        Err(e) => {
            tracing::warn!("Rejected normalized market data: {}", e);
            PriceMatrix::empty()
        }
    }
}

/// Carry the last seen value forward, then seed leading gaps from the first
/// observation.
pub fn fill_forward_then_backward(values: &mut [Option<f64>]) {
    let mut carry = None;
    for v in values.iter_mut() {
        match v {
            Some(x) => carry = Some(*x),
            None => *v = carry,
        }
    }
    let mut carry = None;
    for v in values.iter_mut().rev() {
        match v {
            Some(x) => carry = Some(*x),
            None => *v = carry,
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
                .map(|dt| dt.date())
        })
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = TimeSeriesStore::new("/definitely/not/here/market_data.csv");
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_missing_date_column_is_empty() {
        let m = TimeSeriesStore::from_csv_str("Day,AAA\n2024-01-01,1\n");
        assert!(m.is_empty());
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(TimeSeriesStore::from_csv_str("Date,AAA,BBB\n").is_empty());
        assert!(TimeSeriesStore::from_csv_str("").is_empty());
    }

    #[test]
    fn test_sorts_and_fills() {
        let csv = "Date,AAA,BBB\n\
                   2024-01-03,12,\n\
                   2024-01-01,,20\n\
                   2024-01-02,11,\n\
                   2024-01-04,,\n";
        let m = TimeSeriesStore::from_csv_str(csv);
        assert_eq!(m.symbols(), &["AAA".to_string(), "BBB".to_string()]);
        // all-empty row on 01-04 dropped
        assert_eq!(m.len(), 3);
        let dates: Vec<NaiveDate> = m.rows().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
        // AAA leading gap backward-filled, BBB forward-filled
        assert_eq!(m.column("AAA").unwrap(), vec![11.0, 11.0, 12.0]);
        assert_eq!(m.column("BBB").unwrap(), vec![20.0, 20.0, 20.0]);
    }

    #[test]
    fn test_fill_leaves_no_gaps() {
        let csv = "Date,A,B,C\n\
                   05-01-2024,1,,\n\
                   01-01-2024,,2,\n\
                   03-01-2024,x,,3\n\
                   02-01-2024,4,5,\n";
        let m = TimeSeriesStore::from_csv_str(csv);
        assert!(m.rows().windows(2).all(|w| w[0].date < w[1].date));
        assert!(m.rows().iter().all(|r| r.prices.iter().all(|p| p.is_finite())));
        assert_eq!(m.column("C").unwrap(), vec![3.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_bad_dates_and_duplicates() {
        let csv = "Date,AAA\n\
                   not-a-date,1\n\
                   2024-02-01,5\n\
                   2024-02-01,6\n\
                   2024-02-02 00:00:00,7\n";
        let m = TimeSeriesStore::from_csv_str(csv);
        assert_eq!(m.len(), 2);
        assert_eq!(m.column("AAA").unwrap(), vec![6.0, 7.0]);
    }

    #[test]
    fn test_all_empty_column_dropped() {
        let csv = "Date,AAA,EMPTY\n2024-01-01,1,\n2024-01-02,2,\n";
        let m = TimeSeriesStore::from_csv_str(csv);
        assert_eq!(m.symbols(), &["AAA".to_string()]);
    }

    #[test]
    fn test_fill_helper() {
        let mut v = vec![None, Some(1.0), None, Some(3.0), None];
        fill_forward_then_backward(&mut v);
        assert_eq!(v, vec![Some(1.0), Some(1.0), Some(1.0), Some(3.0), Some(3.0)]);
    }
}
