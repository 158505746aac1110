use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::engine::ReturnTable;
use crate::types::Rate;

/// Frequency of return observations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl ReturnFrequency {
    /// Number of periods in a year for annualisation
    pub fn periods_per_year(&self) -> Decimal {
        match self {
            ReturnFrequency::Daily => dec!(252),
            ReturnFrequency::Weekly => dec!(52),
            ReturnFrequency::Monthly => dec!(12),
            ReturnFrequency::Quarterly => dec!(4),
            ReturnFrequency::Annual => dec!(1),
        }
    }
}

/// Descriptive statistics of one asset's return series.
///
/// A statistic is `None` when it cannot be represented in 128-bit decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    pub asset: String,
    pub observations: usize,
    pub mean_return: Option<Rate>,
    pub volatility: Option<Rate>,
    pub annualised_return: Option<Rate>,
    pub annualised_volatility: Option<Rate>,
}

impl AssetSummary {
    pub fn is_defined(&self) -> bool {
        self.mean_return.is_some()
            && self.volatility.is_some()
            && self.annualised_return.is_some()
            && self.annualised_volatility.is_some()
    }
}

/// Sample (n-1) covariance of the assets' periodic returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovarianceMatrix {
    pub assets: Vec<String>,
    /// Row-major, symmetric, `assets.len()` square.
    pub values: Vec<Vec<Rate>>,
}

/// Per-asset mean and sample volatility, plain and annualised.
pub fn summarise_returns(table: &ReturnTable, frequency: ReturnFrequency) -> Vec<AssetSummary> {
    let periods = frequency.periods_per_year();

    table
        .assets()
        .iter()
        .enumerate()
        .map(|(col, asset)| {
            let series = table.column_at(col).unwrap_or_default();
            let mean_return = mean(&series);
            let volatility = mean_return
                .and_then(|m| sample_covariance(&series, &series, m, m))
                .and_then(sqrt_decimal);
            AssetSummary {
                asset: asset.clone(),
                observations: series.len(),
                mean_return,
                volatility,
                annualised_return: mean_return.and_then(|m| m.checked_mul(periods)),
                annualised_volatility: volatility
                    .zip(sqrt_decimal(periods))
                    .and_then(|(v, s)| v.checked_mul(s)),
            }
        })
        .collect()
}

/// Sample covariance matrix of the table's assets. `None` with fewer than
/// two rows or when any entry overflows.
pub fn covariance_matrix(table: &ReturnTable) -> Option<CovarianceMatrix> {
    if table.len() < 2 {
        return None;
    }
    let columns: Vec<Vec<Rate>> = (0..table.assets().len())
        .map(|col| table.column_at(col))
        .collect::<Option<_>>()?;
    let means: Vec<Rate> = columns.iter().map(|c| mean(c)).collect::<Option<_>>()?;

    let k = columns.len();
    let mut values = vec![vec![Decimal::ZERO; k]; k];
    for i in 0..k {
        for j in i..k {
            let cov = sample_covariance(&columns[i], &columns[j], means[i], means[j])?;
            values[i][j] = cov;
            values[j][i] = cov;
        }
    }
    Some(CovarianceMatrix {
        assets: table.assets().to_vec(),
        values,
    })
}

/// Arithmetic mean; zero for an empty series.
fn mean(data: &[Decimal]) -> Option<Decimal> {
    if data.is_empty() {
        return Some(Decimal::ZERO);
    }
    let sum = data
        .iter()
        .try_fold(Decimal::ZERO, |acc, x| acc.checked_add(*x))?;
    sum.checked_div(Decimal::from(data.len() as i64))
}

/// Sample covariance (n-1 denominator); zero below two observations.
fn sample_covariance(x: &[Decimal], y: &[Decimal], x_mean: Decimal, y_mean: Decimal) -> Option<Decimal> {
    let n = x.len().min(y.len());
    if n < 2 {
        return Some(Decimal::ZERO);
    }
    let sum = x.iter().zip(y.iter()).try_fold(Decimal::ZERO, |acc, (xi, yi)| {
        let dx = xi.checked_sub(x_mean)?;
        let dy = yi.checked_sub(y_mean)?;
        acc.checked_add(dx.checked_mul(dy)?)
    })?;
    sum.checked_div(Decimal::from((n - 1) as i64))
}

fn sqrt_decimal(val: Decimal) -> Option<Decimal> {
    if val <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    val.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::engine::ReturnRow;
    use chrono::NaiveDate;

    fn row(i: usize, values: Vec<Decimal>) -> ReturnRow {
        ReturnRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap(),
            returns: values,
        }
    }

    fn table(values: &[Decimal]) -> ReturnTable {
        let rows = values
            .iter()
            .enumerate()
            .map(|(i, v)| row(i, vec![*v]))
            .collect();
        ReturnTable::new(vec!["A".into()], rows).unwrap()
    }

    #[test]
    fn test_mean_and_annualisation() {
        let s = summarise_returns(&table(&[dec!(0.01), dec!(0.03)]), ReturnFrequency::Daily);
        assert_eq!(s[0].observations, 2);
        assert_eq!(s[0].mean_return, Some(dec!(0.02)));
        assert_eq!(s[0].annualised_return, Some(dec!(5.04)));
        // sd of {0.01, 0.03} with n-1 = sqrt(0.0002)
        let vol = s[0].volatility.unwrap();
        assert!((vol - dec!(0.0141421356)).abs() < dec!(0.0000001));
        assert!(s[0].is_defined());
    }

    #[test]
    fn test_single_observation_has_zero_volatility() {
        let s = summarise_returns(&table(&[dec!(0.05)]), ReturnFrequency::Monthly);
        assert_eq!(s[0].volatility, Some(Decimal::ZERO));
        assert_eq!(s[0].annualised_return, Some(dec!(0.60)));
    }

    #[test]
    fn test_empty_table() {
        let s = summarise_returns(&table(&[]), ReturnFrequency::Daily);
        assert_eq!(s[0].observations, 0);
        assert_eq!(s[0].mean_return, Some(Decimal::ZERO));
    }

    #[test]
    fn test_huge_return_leaves_volatility_undefined() {
        // 0.0001 -> 1e12 -> 1e12: squaring the deviation exceeds Decimal range
        let s = summarise_returns(
            &table(&[dec!(9999999999999999), Decimal::ZERO]),
            ReturnFrequency::Daily,
        );
        assert_eq!(s[0].mean_return, Some(dec!(4999999999999999.5)));
        assert_eq!(s[0].volatility, None);
        assert_eq!(s[0].annualised_volatility, None);
        assert!(!s[0].is_defined());
        assert!(covariance_matrix(&table(&[dec!(9999999999999999), Decimal::ZERO])).is_none());
    }

    #[test]
    fn test_mean_overflow_is_undefined() {
        let s = summarise_returns(&table(&[Decimal::MAX, Decimal::MAX]), ReturnFrequency::Daily);
        assert_eq!(s[0].mean_return, None);
        assert_eq!(s[0].annualised_return, None);
        assert_eq!(s[0].volatility, None);
    }

    #[test]
    fn test_covariance_matrix() {
        let rows = vec![
            row(0, vec![dec!(0.01), dec!(0.02)]),
            row(1, vec![dec!(0.03), dec!(-0.02)]),
        ];
        let t = ReturnTable::new(vec!["A".into(), "B".into()], rows).unwrap();
        let cov = covariance_matrix(&t).unwrap();
        // A: var 0.0002; B: var 0.0008; cov(A, B) = -0.0004
        assert_eq!(cov.values[0][0], dec!(0.0002));
        assert_eq!(cov.values[1][1], dec!(0.0008));
        assert_eq!(cov.values[0][1], dec!(-0.0004));
        assert_eq!(cov.values[1][0], cov.values[0][1]);
    }

    #[test]
    fn test_covariance_needs_two_rows() {
        assert!(covariance_matrix(&table(&[dec!(0.01)])).is_none());
    }
}
