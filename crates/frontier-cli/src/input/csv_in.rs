use chrono::NaiveDate;
use std::collections::HashSet;
use std::io::Read;

use frontier_core::frontier::{AssetWeight, PortfolioRecord, PortfolioSet};
use frontier_core::returns::prices::parse_price;
use frontier_core::returns::{PriceProvider, PriceTable, ReturnsConfig};
use frontier_core::{FrontierError, FrontierResult};

use crate::input::file;

const VOLATILITY_COLUMNS: [&str; 4] = ["vol", "volatility", "sigma", "risk"];
const RETURN_COLUMNS: [&str; 4] = ["ret", "return", "expected_return", "mu"];
const SHARPE_COLUMNS: [&str; 2] = ["sharpe", "sharpe_ratio"];

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

/// Wide price CSV on disk: `date,SYM1,SYM2,...`, one row per date.
pub struct CsvPriceFile {
    path: String,
}

impl CsvPriceFile {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Load the whole file, returning symbols in header order.
    pub fn load(&self) -> FrontierResult<(Vec<String>, PriceTable)> {
        let reader = file::open(&self.path).map_err(|e| FrontierError::InvalidInput {
            field: "prices".into(),
            reason: e.to_string(),
        })?;
        read_price_table(reader)
    }
}

impl PriceProvider for CsvPriceFile {
    fn fetch(&self, config: &ReturnsConfig) -> FrontierResult<PriceTable> {
        let (_, table) = self.load()?;
        tracing::debug!(path = %self.path, dates = table.len(), "loaded price file");
        table.fetch(config)
    }
}

/// Parse a wide price CSV. The first column holds dates; every other column
/// is a symbol. Empty or `NaN` cells are missing prices.
pub fn read_price_table<R: Read>(reader: R) -> FrontierResult<(Vec<String>, PriceTable)> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers().map_err(csv_error)?.clone();
    if headers.len() < 2 {
        return Err(FrontierError::InvalidInput {
            field: "prices".into(),
            reason: "Expected a date column followed by at least one symbol column".into(),
        });
    }
    let symbols: Vec<String> = headers.iter().skip(1).map(|h| h.to_string()).collect();

    let mut table = PriceTable::new();
    let mut seen = HashSet::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let date = parse_date(record.get(0).unwrap_or_default())?;
        if !seen.insert(date) {
            return Err(FrontierError::InvalidInput {
                field: "prices".into(),
                reason: format!("Duplicate date {} on data row {}", date, line + 1),
            });
        }
        table.add_date(date);
        for (symbol, cell) in symbols.iter().zip(record.iter().skip(1)) {
            if let Some(price) = parse_price(cell) {
                table.insert(date, symbol.clone(), price);
            }
        }
    }
    Ok((symbols, table))
}

/// Accepts `YYYY-MM-DD`, ignoring any trailing time component.
fn parse_date(cell: &str) -> FrontierResult<NaiveDate> {
    let day = cell.get(..10).unwrap_or(cell);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| FrontierError::DateError(format!("'{}': {}", cell, e)))
}

fn csv_error(e: csv::Error) -> FrontierError {
    FrontierError::SerializationError(e.to_string())
}

// ---------------------------------------------------------------------------
// Portfolios
// ---------------------------------------------------------------------------

/// Parse a candidate-portfolio CSV. Volatility, return and Sharpe columns are
/// found by name; every other column is read as an asset weight.
pub fn read_portfolio_set<R: Read>(reader: R) -> FrontierResult<PortfolioSet> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers().map_err(csv_error)?.clone();

    let vol_col = find_column(&headers, &VOLATILITY_COLUMNS, "volatility")?;
    let ret_col = find_column(&headers, &RETURN_COLUMNS, "expected return")?;
    let sharpe_col = find_column(&headers, &SHARPE_COLUMNS, "sharpe")?;
    let weight_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| ![vol_col, ret_col, sharpe_col].contains(i))
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut set = PortfolioSet::default();
    for record in rdr.records() {
        let record = record.map_err(csv_error)?;
        let cell = |i: usize| parse_f64(record.get(i).unwrap_or_default());
        let mut portfolio = PortfolioRecord::new(cell(vol_col), cell(ret_col), cell(sharpe_col));
        portfolio.weights = weight_cols
            .iter()
            .map(|(i, name)| AssetWeight {
                name: name.clone(),
                weight: cell(*i),
            })
            .collect();
        set.push(portfolio);
    }
    Ok(set)
}

fn find_column(headers: &csv::StringRecord, names: &[&str], label: &str) -> FrontierResult<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
        .ok_or_else(|| FrontierError::InvalidInput {
            field: "portfolios".into(),
            reason: format!("No {} column (expected one of: {})", label, names.join(", ")),
        })
}

/// Undefined or unparsable cells become NaN.
fn parse_f64(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(f64::NAN)
}
