use serde::{Deserialize, Serialize};

use crate::types::f64_or_nan;

/// Weight of one asset inside a candidate portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetWeight {
    pub name: String,
    pub weight: f64,
}

/// A candidate portfolio as produced upstream.
///
/// `sharpe` is taken as given; it may be NaN and is never recomputed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRecord {
    /// Standard deviation of portfolio returns.
    #[serde(alias = "vol", deserialize_with = "f64_or_nan")]
    pub volatility: f64,
    #[serde(alias = "ret", deserialize_with = "f64_or_nan")]
    pub expected_return: f64,
    #[serde(deserialize_with = "f64_or_nan")]
    pub sharpe: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weights: Vec<AssetWeight>,
}

impl PortfolioRecord {
    pub fn new(volatility: f64, expected_return: f64, sharpe: f64) -> Self {
        Self {
            volatility,
            expected_return,
            sharpe,
            weights: Vec::new(),
        }
    }
}

/// Candidate portfolios in the producer's order. The order is the
/// tie-break order for selection and carries no other meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortfolioSet {
    records: Vec<PortfolioRecord>,
}

impl PortfolioSet {
    pub fn new(records: Vec<PortfolioRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: PortfolioRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PortfolioRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PortfolioRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[PortfolioRecord] {
        &self.records
    }
}

impl FromIterator<PortfolioRecord> for PortfolioSet {
    fn from_iter<I: IntoIterator<Item = PortfolioRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PortfolioSet {
    type Item = &'a PortfolioRecord;
    type IntoIter = std::slice::Iter<'a, PortfolioRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
