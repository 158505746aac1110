use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::FrontierError;
use crate::types::Money;
use crate::FrontierResult;

// ---------------------------------------------------------------------------
// Price table
// ---------------------------------------------------------------------------

/// Adjusted closing prices keyed by date, then by symbol.
///
/// Dates are unique and iterate in ascending order. A symbol absent from a
/// date's record means the price for that date is missing. When read from
/// JSON, `null`, `"NaN"` and unparsable cells are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable {
    #[serde(deserialize_with = "prices_or_missing")]
    observations: BTreeMap<NaiveDate, BTreeMap<String, Money>>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a price, replacing any earlier value for the same date and symbol.
    pub fn insert(&mut self, date: NaiveDate, symbol: impl Into<String>, price: Money) {
        self.observations
            .entry(date)
            .or_default()
            .insert(symbol.into(), price);
    }

    /// Register a date even if none of its prices are defined.
    pub fn add_date(&mut self, date: NaiveDate) {
        self.observations.entry(date).or_default();
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.observations.keys().copied()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.keys().next_back().copied()
    }

    pub fn price(&self, date: NaiveDate, symbol: &str) -> Option<Money> {
        self.observations.get(&date)?.get(symbol).copied()
    }

    /// Iterate `(date, prices)` pairs in ascending date order.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, &BTreeMap<String, Money>)> {
        self.observations.iter().map(|(d, p)| (*d, p))
    }

    /// Symbols carrying a price on at least one date.
    pub fn symbols(&self) -> BTreeSet<String> {
        self.observations
            .values()
            .flat_map(|row| row.keys().cloned())
            .collect()
    }

    /// Restrict the table to `symbols`, keeping every date.
    pub fn select(&self, symbols: &[String]) -> PriceTable {
        let observations = self
            .observations
            .iter()
            .map(|(date, row)| {
                let kept = row
                    .iter()
                    .filter(|(s, _)| symbols.contains(s))
                    .map(|(s, p)| (s.clone(), *p))
                    .collect();
                (*date, kept)
            })
            .collect();
        PriceTable { observations }
    }

    /// Keep only the dates that fall inside `window`, measured back from the
    /// last date in the table.
    pub fn within(&self, window: HistoryWindow) -> FrontierResult<PriceTable> {
        let Some(last) = self.last_date() else {
            return Ok(self.clone());
        };
        let Some(cutoff) = window.start_from(last)? else {
            return Ok(self.clone());
        };
        Ok(PriceTable {
            observations: self
                .observations
                .range(cutoff..)
                .map(|(d, row)| (*d, row.clone()))
                .collect(),
        })
    }
}

/// Parse a price cell. Empty, `NaN`, or unparsable cells are missing.
pub fn parse_price(cell: &str) -> Option<Money> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// One JSON price cell as it may appear in exported data.
#[derive(Deserialize)]
#[serde(untagged)]
enum PriceCell {
    Text(String),
    Price(Money),
    Other(serde::de::IgnoredAny),
}

/// Deserialize the date -> symbol -> price map, dropping undefined cells
/// while keeping every date.
fn prices_or_missing<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<NaiveDate, BTreeMap<String, Money>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<NaiveDate, BTreeMap<String, Option<PriceCell>>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(date, row)| {
            let kept = row
                .into_iter()
                .filter_map(|(symbol, cell)| {
                    let price = match cell? {
                        PriceCell::Price(p) => Some(p),
                        PriceCell::Text(t) => parse_price(&t),
                        PriceCell::Other(_) => None,
                    }?;
                    Some((symbol, price))
                })
                .collect();
            (date, kept)
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Historical window, written as a period string: `30d`, `6mo`, `2y`, `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HistoryWindow {
    Days(u32),
    Months(u32),
    Years(u32),
    Max,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        HistoryWindow::Years(2)
    }
}

impl HistoryWindow {
    /// First date inside the window ending at `last`, or `None` for `Max`.
    pub fn start_from(&self, last: NaiveDate) -> FrontierResult<Option<NaiveDate>> {
        let start = match *self {
            HistoryWindow::Max => return Ok(None),
            HistoryWindow::Days(n) => last.checked_sub_days(Days::new(u64::from(n))),
            HistoryWindow::Months(n) => last.checked_sub_months(Months::new(n)),
            HistoryWindow::Years(n) => n
                .checked_mul(12)
                .and_then(|m| last.checked_sub_months(Months::new(m))),
        };
        start
            .map(Some)
            .ok_or_else(|| FrontierError::DateError(format!("window {} before {} is out of range", self, last)))
    }
}

impl FromStr for HistoryWindow {
    type Err = FrontierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if lower == "max" {
            return Ok(HistoryWindow::Max);
        }
        let split = lower
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(lower.len());
        let (digits, unit) = lower.split_at(split);
        let invalid = || FrontierError::InvalidInput {
            field: "window".into(),
            reason: format!("'{}' is not a period like 30d, 6mo, 2y or max", s),
        };
        let n: u32 = digits.parse().map_err(|_| invalid())?;
        if n == 0 {
            return Err(invalid());
        }
        match unit {
            "d" => Ok(HistoryWindow::Days(n)),
            "mo" => Ok(HistoryWindow::Months(n)),
            "y" => Ok(HistoryWindow::Years(n)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for HistoryWindow {
    type Error = FrontierError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<HistoryWindow> for String {
    fn from(w: HistoryWindow) -> Self {
        w.to_string()
    }
}

impl fmt::Display for HistoryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryWindow::Days(n) => write!(f, "{}d", n),
            HistoryWindow::Months(n) => write!(f, "{}mo", n),
            HistoryWindow::Years(n) => write!(f, "{}y", n),
            HistoryWindow::Max => write!(f, "max"),
        }
    }
}

/// Explicit run configuration for the returns engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnsConfig {
    /// Asset symbols, in output column order.
    pub symbols: Vec<String>,
    /// Historical window measured back from the latest price date.
    #[serde(default)]
    pub window: HistoryWindow,
}
