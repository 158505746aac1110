use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use super::prices::{PriceTable, ReturnsConfig};
use super::summary::{covariance_matrix, summarise_returns, AssetSummary, CovarianceMatrix, ReturnFrequency};
use crate::error::FrontierError;
use crate::types::*;
use crate::FrontierResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Simple returns of every asset for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRow {
    pub date: NaiveDate,
    /// One return per asset, in the table's asset order.
    pub returns: Vec<Rate>,
}

/// Daily simple returns, one row per date, one column per asset.
///
/// Every cell is defined: rows with any undefined return never enter the table.
/// Dates are strictly ascending and every row holds one return per asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReturnTable")]
pub struct ReturnTable {
    assets: Vec<String>,
    rows: Vec<ReturnRow>,
}

#[derive(Deserialize)]
struct RawReturnTable {
    assets: Vec<String>,
    rows: Vec<ReturnRow>,
}

impl TryFrom<RawReturnTable> for ReturnTable {
    type Error = FrontierError;

    fn try_from(raw: RawReturnTable) -> Result<Self, Self::Error> {
        ReturnTable::new(raw.assets, raw.rows)
    }
}

impl ReturnTable {
    /// Build a table, checking row widths and date ordering.
    pub fn new(assets: Vec<String>, rows: Vec<ReturnRow>) -> FrontierResult<Self> {
        if let Some(row) = rows.iter().find(|r| r.returns.len() != assets.len()) {
            return Err(FrontierError::InvalidInput {
                field: "rows".into(),
                reason: format!(
                    "Row {} has {} returns for {} assets",
                    row.date,
                    row.returns.len(),
                    assets.len()
                ),
            });
        }
        if let Some(pair) = rows.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(FrontierError::InvalidInput {
                field: "rows".into(),
                reason: format!("Dates must be strictly ascending ({} then {})", pair[0].date, pair[1].date),
            });
        }
        Ok(Self { assets, rows })
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn rows(&self) -> &[ReturnRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.iter().map(|r| r.date)
    }

    pub fn asset_index(&self, symbol: &str) -> Option<usize> {
        self.assets.iter().position(|a| a == symbol)
    }

    /// Return of `symbol` on `date`, if that row survived.
    pub fn get(&self, date: NaiveDate, symbol: &str) -> Option<Rate> {
        let col = self.asset_index(symbol)?;
        let idx = self.rows.binary_search_by_key(&date, |r| r.date).ok()?;
        self.rows[idx].returns.get(col).copied()
    }

    /// Full return series of one asset.
    pub fn column(&self, symbol: &str) -> Option<Vec<Rate>> {
        let col = self.asset_index(symbol)?;
        self.column_at(col)
    }

    pub(crate) fn column_at(&self, col: usize) -> Option<Vec<Rate>> {
        self.rows.iter().map(|r| r.returns.get(col).copied()).collect()
    }
}

/// Input for the windowed returns calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnsInput {
    pub prices: PriceTable,
    pub config: ReturnsConfig,
    /// Observation frequency used for the annualised summary (default daily)
    #[serde(default)]
    pub frequency: ReturnFrequency,
}

/// Output of the windowed returns calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnsOutput {
    pub returns: ReturnTable,
    pub summary: Vec<AssetSummary>,
    /// Sample covariance of periodic returns; absent below two rows or on overflow.
    pub covariance: Option<CovarianceMatrix>,
    /// Return rows produced.
    pub observations: usize,
    /// Price dates inside the window.
    pub price_dates: usize,
    /// Dates dropped because a price or its predecessor was undefined.
    pub dropped_dates: Vec<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_end: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Convert prices into simple daily returns, `P_t / P_{t-1} - 1`.
///
/// The first date never produces a row. A date is dropped for every asset when
/// any asset's price on that date or on the preceding date is missing or
/// non-positive, or when the ratio cannot be represented.
pub fn compute_returns(prices: &PriceTable, assets: &[String]) -> FrontierResult<ReturnTable> {
    if prices.len() < 2 {
        return Err(FrontierError::InsufficientHistory {
            dates: prices.len(),
        });
    }
    validate_assets(prices, assets)?;

    let mut rows = Vec::with_capacity(prices.len() - 1);
    let mut prev: Option<&BTreeMap<String, Money>> = None;

    for (date, current) in prices.rows() {
        if let Some(previous) = prev {
            match row_returns(previous, current, assets) {
                Some(returns) => rows.push(ReturnRow { date, returns }),
                None => tracing::debug!(%date, "dropping return row with undefined price"),
            }
        }
        prev = Some(current);
    }

    Ok(ReturnTable {
        assets: assets.to_vec(),
        rows,
    })
}

/// Apply the configured window, compute returns, and summarise each asset.
pub fn calculate_returns(
    input: &ReturnsInput,
) -> FrontierResult<ComputationOutput<ReturnsOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let windowed = input.prices.within(input.config.window)?;
    let table = compute_returns(&windowed, &input.config.symbols)?;

    let kept: HashSet<NaiveDate> = table.dates().collect();
    let dropped_dates: Vec<NaiveDate> = windowed
        .dates()
        .skip(1)
        .filter(|d| !kept.contains(d))
        .collect();
    if !dropped_dates.is_empty() {
        warnings.push(format!(
            "{} date(s) dropped for undefined prices: {}",
            dropped_dates.len(),
            dropped_dates
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    if table.is_empty() {
        warnings.push("No date has a defined return for every asset".into());
    }

    let summary = summarise_returns(&table, input.frequency);
    let undefined: Vec<&str> = summary
        .iter()
        .filter(|s| !s.is_defined())
        .map(|s| s.asset.as_str())
        .collect();
    if !undefined.is_empty() {
        warnings.push(format!(
            "Summary statistics exceed decimal range for: {}",
            undefined.join(", ")
        ));
    }
    let covariance = covariance_matrix(&table);
    if covariance.is_none() && table.len() >= 2 {
        warnings.push("Covariance matrix exceeds decimal range".into());
    }

    let output = ReturnsOutput {
        summary,
        covariance,
        observations: table.len(),
        price_dates: windowed.len(),
        dropped_dates,
        window_start: windowed.first_date(),
        window_end: windowed.last_date(),
        returns: table,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Simple daily returns (P_t / P_{t-1} - 1), row-wise drop of undefined observations",
        &serde_json::json!({
            "symbols": input.config.symbols,
            "window": input.config.window.to_string(),
            "frequency": format!("{:?}", input.frequency),
        }),
        warnings,
        elapsed,
        "rust_decimal_128bit",
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_assets(prices: &PriceTable, assets: &[String]) -> FrontierResult<()> {
    if assets.is_empty() {
        return Err(FrontierError::InvalidInput {
            field: "assets".into(),
            reason: "At least one asset symbol is required".into(),
        });
    }
    let mut seen = HashSet::new();
    for a in assets {
        if !seen.insert(a.as_str()) {
            return Err(FrontierError::InvalidInput {
                field: "assets".into(),
                reason: format!("Symbol '{}' listed more than once", a),
            });
        }
    }
    let known = prices.symbols();
    if let Some(missing) = assets.iter().find(|a| !known.contains(*a)) {
        return Err(FrontierError::UnknownSymbol(missing.clone()));
    }
    Ok(())
}

/// Returns for one date, or `None` if any cell is undefined. Undefined prices
/// are filtered before dividing.
fn row_returns(
    previous: &BTreeMap<String, Money>,
    current: &BTreeMap<String, Money>,
    assets: &[String],
) -> Option<Vec<Rate>> {
    assets
        .iter()
        .map(|a| {
            let p0 = defined_price(previous, a)?;
            let p1 = defined_price(current, a)?;
            p1.checked_div(p0)?.checked_sub(Decimal::ONE)
        })
        .collect()
}

fn defined_price(row: &BTreeMap<String, Money>, symbol: &str) -> Option<Money> {
    row.get(symbol).copied().filter(|p| *p > Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn syms(s: &[&str]) -> Vec<String> {
        s.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_known_values() {
        let mut t = PriceTable::new();
        t.insert(d(1), "A", dec!(100));
        t.insert(d(2), "A", dec!(110));
        t.insert(d(3), "A", dec!(99));

        let r = compute_returns(&t, &syms(&["A"])).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.get(d(2), "A"), Some(dec!(0.1)));
        assert_eq!(r.get(d(3), "A"), Some(dec!(-0.1)));
        assert_eq!(r.get(d(1), "A"), None);
    }

    #[test]
    fn test_single_date_is_insufficient() {
        let mut t = PriceTable::new();
        t.insert(d(1), "A", dec!(100));
        let err = compute_returns(&t, &syms(&["A"])).unwrap_err();
        assert!(matches!(err, FrontierError::InsufficientHistory { dates: 1 }));
    }

    #[test]
    fn test_non_positive_price_drops_row_and_successor() {
        let mut t = PriceTable::new();
        t.insert(d(1), "A", dec!(10));
        t.insert(d(2), "A", dec!(0));
        t.insert(d(3), "A", dec!(12));
        t.insert(d(4), "A", dec!(15));

        let r = compute_returns(&t, &syms(&["A"])).unwrap();
        let dates: Vec<_> = r.dates().collect();
        assert_eq!(dates, vec![d(4)]);
        assert_eq!(r.get(d(4), "A"), Some(dec!(0.25)));
    }

    #[test]
    fn test_column_order_follows_assets() {
        let mut t = PriceTable::new();
        for (day, a, b) in [(1, dec!(10), dec!(20)), (2, dec!(11), dec!(18))] {
            t.insert(d(day), "A", a);
            t.insert(d(day), "B", b);
        }
        let r = compute_returns(&t, &syms(&["B", "A"])).unwrap();
        assert_eq!(r.assets(), syms(&["B", "A"]).as_slice());
        assert_eq!(r.rows()[0].returns, vec![dec!(-0.1), dec!(0.1)]);
        assert_eq!(r.column("A"), Some(vec![dec!(0.1)]));
    }

    #[test]
    fn test_duplicate_and_empty_assets_rejected() {
        let mut t = PriceTable::new();
        t.insert(d(1), "A", dec!(1));
        t.insert(d(2), "A", dec!(2));
        assert!(compute_returns(&t, &[]).is_err());
        assert!(compute_returns(&t, &syms(&["A", "A"])).is_err());
        assert!(matches!(
            compute_returns(&t, &syms(&["Z"])).unwrap_err(),
            FrontierError::UnknownSymbol(_)
        ));
    }

    #[test]
    fn test_calculate_returns_reports_dropped_dates() {
        let mut t = PriceTable::new();
        t.insert(d(1), "A", dec!(10));
        t.insert(d(1), "B", dec!(10));
        t.insert(d(2), "A", dec!(11));
        t.insert(d(3), "A", dec!(12));
        t.insert(d(3), "B", dec!(11));
        t.insert(d(4), "A", dec!(12));
        t.insert(d(4), "B", dec!(12));

        let input = ReturnsInput {
            prices: t,
            config: ReturnsConfig {
                symbols: syms(&["A", "B"]),
                window: crate::returns::HistoryWindow::Max,
            },
            frequency: ReturnFrequency::Daily,
        };
        let out = calculate_returns(&input).unwrap();
        assert_eq!(out.result.dropped_dates, vec![d(2), d(3)]);
        assert_eq!(out.result.returns.len(), 1);
        assert_eq!(out.result.observations, 1);
        assert_eq!(out.result.price_dates, 4);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.result.summary.len(), 2);
    }

    #[test]
    fn test_negative_price_drops_row_for_every_asset() {
        let mut t = PriceTable::new();
        for (day, a, b) in [
            (1, dec!(10), dec!(20)),
            (2, dec!(-11), dec!(21)),
            (3, dec!(12), dec!(22)),
            (4, dec!(12), dec!(11)),
        ] {
            t.insert(d(day), "A", a);
            t.insert(d(day), "B", b);
        }
        let r = compute_returns(&t, &syms(&["A", "B"])).unwrap();
        let dates: Vec<_> = r.dates().collect();
        assert_eq!(dates, vec![d(4)]);
        assert_eq!(r.get(d(2), "B"), None);
        assert_eq!(r.get(d(3), "B"), None);
        assert_eq!(r.get(d(4), "B"), Some(dec!(-0.5)));
    }

    #[test]
    fn test_unrepresentable_ratio_drops_row() {
        let tiny = Decimal::new(1, 28);
        let mut t = PriceTable::new();
        t.insert(d(1), "A", tiny);
        t.insert(d(1), "B", dec!(5));
        t.insert(d(2), "A", Decimal::MAX);
        t.insert(d(2), "B", dec!(6));
        t.insert(d(3), "A", Decimal::MAX);
        t.insert(d(3), "B", dec!(3));

        let r = compute_returns(&t, &syms(&["A", "B"])).unwrap();
        let dates: Vec<_> = r.dates().collect();
        assert_eq!(dates, vec![d(3)]);
        assert_eq!(r.get(d(2), "B"), None);
        assert_eq!(r.get(d(3), "A"), Some(Decimal::ZERO));
    }

    #[test]
    fn test_huge_jump_keeps_returns_and_warns() {
        let mut t = PriceTable::new();
        t.insert(d(1), "A", dec!(0.0001));
        t.insert(d(2), "A", dec!(1000000000000));
        t.insert(d(3), "A", dec!(1000000000000));
        let input = ReturnsInput {
            prices: t,
            config: ReturnsConfig {
                symbols: syms(&["A"]),
                window: crate::returns::HistoryWindow::Max,
            },
            frequency: ReturnFrequency::Daily,
        };
        let out = calculate_returns(&input).unwrap();
        assert_eq!(
            out.result.returns.column("A"),
            Some(vec![dec!(9999999999999999), Decimal::ZERO])
        );
        assert_eq!(out.result.summary[0].volatility, None);
        assert!(out.result.covariance.is_none());
        assert!(out.warnings.iter().any(|w| w.contains("decimal range")));
    }

    #[test]
    fn test_return_table_rejects_short_rows() {
        let rows = vec![ReturnRow {
            date: d(2),
            returns: vec![dec!(0.1)],
        }];
        assert!(ReturnTable::new(syms(&["A", "B"]), rows).is_err());

        let json = r#"{"assets": ["A", "B"], "rows": [{"date": "2024-03-02", "returns": ["0.1"]}]}"#;
        assert!(serde_json::from_str::<ReturnTable>(json).is_err());
    }

    #[test]
    fn test_return_table_rejects_unordered_dates() {
        let rows = vec![
            ReturnRow { date: d(3), returns: vec![dec!(0.1)] },
            ReturnRow { date: d(2), returns: vec![dec!(0.2)] },
        ];
        assert!(ReturnTable::new(syms(&["A"]), rows).is_err());
    }
}
