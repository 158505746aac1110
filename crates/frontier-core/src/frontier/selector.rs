use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::portfolio::{PortfolioRecord, PortfolioSet};
use crate::error::FrontierError;
use crate::types::*;
use crate::FrontierResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The max-Sharpe candidate, referenced by its position in the set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimalSelection<'a> {
    pub index: usize,
    pub record: &'a PortfolioRecord,
}

/// Everything a renderer needs: the full scatter and the one highlighted row.
#[derive(Debug, Clone, Serialize)]
pub struct FrontierView<'a> {
    pub portfolios: &'a PortfolioSet,
    pub optimal: OptimalSelection<'a>,
}

impl<'a> FrontierView<'a> {
    pub fn new(portfolios: &'a PortfolioSet) -> FrontierResult<Self> {
        let optimal = select_optimal(portfolios)?;
        Ok(Self {
            portfolios,
            optimal,
        })
    }
}

/// Input for frontier analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontierInput {
    pub portfolios: PortfolioSet,
}

/// Output of frontier analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontierReport {
    /// Position of the max-Sharpe row in the input set.
    pub optimal_index: usize,
    /// Copy of that row, identical to `portfolios[optimal_index]`.
    pub optimal: PortfolioRecord,
    pub max_sharpe: f64,
    pub candidates: usize,
    /// Candidates whose Sharpe ratio is NaN.
    pub undefined_sharpe: usize,
    /// Candidates sharing the maximum Sharpe ratio exactly.
    pub tied_at_max: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Select the candidate with the largest Sharpe ratio in one pass.
///
/// Exact ties go to the lowest index. NaN never wins; if every Sharpe value
/// is NaN the selection fails with [`FrontierError::NoValidCandidate`].
pub fn select_optimal(portfolios: &PortfolioSet) -> FrontierResult<OptimalSelection<'_>> {
    if portfolios.is_empty() {
        return Err(FrontierError::EmptyPortfolioSet);
    }

    let mut best: Option<(usize, &PortfolioRecord)> = None;
    for (index, record) in portfolios.iter().enumerate() {
        if record.sharpe.is_nan() {
            continue;
        }
        match best {
            Some((_, leader)) if record.sharpe <= leader.sharpe => {}
            _ => best = Some((index, record)),
        }
    }

    let (index, record) = best.ok_or(FrontierError::NoValidCandidate {
        candidates: portfolios.len(),
    })?;
    tracing::debug!(index, sharpe = record.sharpe, "selected max-Sharpe portfolio");
    Ok(OptimalSelection { index, record })
}

/// Select the max-Sharpe portfolio and report on the candidate set.
pub fn analyse_frontier(
    input: &FrontierInput,
) -> FrontierResult<ComputationOutput<FrontierReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let selection = select_optimal(&input.portfolios)?;
    let max_sharpe = selection.record.sharpe;

    let undefined_sharpe = input
        .portfolios
        .iter()
        .filter(|r| r.sharpe.is_nan())
        .count();
    let tied_at_max = input
        .portfolios
        .iter()
        .filter(|r| r.sharpe == max_sharpe)
        .count();

    if undefined_sharpe > 0 {
        warnings.push(format!(
            "{} of {} candidates have an undefined Sharpe ratio and were skipped",
            undefined_sharpe,
            input.portfolios.len()
        ));
    }
    if tied_at_max > 1 {
        warnings.push(format!(
            "{} candidates tie at the maximum Sharpe ratio; the first (index {}) is selected",
            tied_at_max, selection.index
        ));
    }

    let output = FrontierReport {
        optimal_index: selection.index,
        optimal: selection.record.clone(),
        max_sharpe,
        candidates: input.portfolios.len(),
        undefined_sharpe,
        tied_at_max,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Maximum Sharpe ratio selection (first occurrence wins, NaN never selected)",
        &serde_json::json!({
            "candidates": input.portfolios.len(),
            "sharpe": "taken as supplied, not recomputed",
        }),
        warnings,
        elapsed,
        "f64",
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(sharpes: &[f64]) -> PortfolioSet {
        sharpes
            .iter()
            .map(|s| PortfolioRecord::new(0.1, 0.1 * s, *s))
            .collect()
    }

    #[test]
    fn test_argmax() {
        let p = PortfolioSet::new(vec![
            PortfolioRecord::new(0.1, 0.05, 0.5),
            PortfolioRecord::new(0.2, 0.30, 1.5),
            PortfolioRecord::new(0.15, 0.10, 0.67),
        ]);
        let sel = select_optimal(&p).unwrap();
        assert_eq!(sel.index, 1);
        assert!(std::ptr::eq(sel.record, p.get(1).unwrap()));
    }

    #[test]
    fn test_first_occurrence_wins_ties() {
        let sel_set = set(&[1.0, 1.0]);
        assert_eq!(select_optimal(&sel_set).unwrap().index, 0);
        let later = set(&[0.2, 3.0, 1.0, 3.0]);
        assert_eq!(select_optimal(&later).unwrap().index, 1);
    }

    #[test]
    fn test_nan_never_wins() {
        let p = set(&[f64::NAN, -2.0, f64::NAN]);
        assert_eq!(select_optimal(&p).unwrap().index, 1);
        let leading = set(&[f64::NAN, 0.1]);
        assert_eq!(select_optimal(&leading).unwrap().index, 1);
    }

    #[test]
    fn test_empty_set_fails() {
        let err = select_optimal(&PortfolioSet::default()).unwrap_err();
        assert!(matches!(err, FrontierError::EmptyPortfolioSet));
    }

    #[test]
    fn test_all_nan_fails() {
        let err = select_optimal(&set(&[f64::NAN, f64::NAN])).unwrap_err();
        assert!(matches!(err, FrontierError::NoValidCandidate { candidates: 2 }));
    }

    #[test]
    fn test_infinite_sharpe_is_defined() {
        let p = set(&[1.0, f64::INFINITY, 2.0]);
        assert_eq!(select_optimal(&p).unwrap().index, 1);
    }

    #[test]
    fn test_analyse_frontier_warnings() {
        let input = FrontierInput {
            portfolios: set(&[f64::NAN, 2.0, 2.0, 1.0]),
        };
        let out = analyse_frontier(&input).unwrap();
        assert_eq!(out.result.optimal_index, 1);
        assert_eq!(out.result.undefined_sharpe, 1);
        assert_eq!(out.result.tied_at_max, 2);
        assert_eq!(out.result.optimal, *input.portfolios.get(1).unwrap());
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_view_serializes_literal_row() {
        let p = set(&[0.3, 0.9]);
        let view = FrontierView::new(&p).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["optimal"]["index"], 1);
        assert_eq!(json["optimal"]["record"], json["portfolios"][1]);
    }
}
