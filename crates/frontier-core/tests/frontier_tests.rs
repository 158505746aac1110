use frontier_core::frontier::{self, FrontierInput, FrontierView, PortfolioRecord, PortfolioSet};
use frontier_core::FrontierError;
use pretty_assertions::assert_eq;

fn sharpes(values: &[f64]) -> PortfolioSet {
    values
        .iter()
        .map(|s| PortfolioRecord::new(0.2, 0.2 * s, *s))
        .collect()
}

// ---------------------------------------------------------------------------
// select_optimal
// ---------------------------------------------------------------------------

#[test]
fn test_argmax_picks_second_record() {
    let set = PortfolioSet::new(vec![
        PortfolioRecord::new(0.1, 0.05, 0.5),
        PortfolioRecord::new(0.2, 0.30, 1.5),
        PortfolioRecord::new(0.15, 0.10, 0.67),
    ]);
    let sel = frontier::select_optimal(&set).unwrap();
    assert_eq!(sel.index, 1);
    assert_eq!(sel.record, &PortfolioRecord::new(0.2, 0.30, 1.5));
}

#[test]
fn test_exact_tie_returns_index_zero() {
    let sel_set = sharpes(&[1.0, 1.0]);
    assert_eq!(frontier::select_optimal(&sel_set).unwrap().index, 0);
}

#[test]
fn test_empty_set_is_an_error() {
    let err = frontier::select_optimal(&PortfolioSet::new(vec![])).unwrap_err();
    assert!(matches!(err, FrontierError::EmptyPortfolioSet));
}

#[test]
fn test_all_nan_is_an_error() {
    let err = frontier::select_optimal(&sharpes(&[f64::NAN; 4])).unwrap_err();
    assert!(matches!(err, FrontierError::NoValidCandidate { candidates: 4 }));
}

#[test]
fn test_nan_loses_to_negative_sharpe() {
    let set = sharpes(&[f64::NAN, -0.4, f64::NAN, -0.9]);
    assert_eq!(frontier::select_optimal(&set).unwrap().index, 1);
}

// ---------------------------------------------------------------------------
// analyse_frontier / rendering contract
// ---------------------------------------------------------------------------

#[test]
fn test_report_row_is_literal_member_of_set() {
    let json = r#"{"portfolios": [
        {"sharpe": 0.81, "ret": 0.12, "vol": 0.148,
         "weights": [{"name": "SPY", "weight": 0.5}, {"name": "GLD", "weight": 0.5}]},
        {"sharpe": 0.95, "ret": 0.14, "vol": 0.147,
         "weights": [{"name": "SPY", "weight": 0.7}, {"name": "GLD", "weight": 0.3}]},
        {"sharpe": "NaN", "ret": 0.0, "vol": 0.0}
    ]}"#;
    let input: FrontierInput = serde_json::from_str(json).unwrap();
    let out = frontier::analyse_frontier(&input).unwrap();

    assert_eq!(out.result.optimal_index, 1);
    assert_eq!(&out.result.optimal, input.portfolios.get(1).unwrap());
    assert_eq!(out.result.candidates, 3);
    assert_eq!(out.result.undefined_sharpe, 1);
    assert_eq!(out.result.tied_at_max, 1);
    assert_eq!(out.result.optimal.weights[0].weight, 0.7);
}

#[test]
fn test_view_matches_selection() {
    let set = sharpes(&[0.4, 1.1, 0.2]);
    let view = FrontierView::new(&set).unwrap();
    assert_eq!(view.optimal.index, 1);
    assert_eq!(view.portfolios.len(), 3);
    assert!(std::ptr::eq(view.optimal.record, set.get(1).unwrap()));
}

#[test]
fn test_analyse_empty_set_propagates_error() {
    let input = FrontierInput {
        portfolios: PortfolioSet::default(),
    };
    assert!(matches!(
        frontier::analyse_frontier(&input).unwrap_err(),
        FrontierError::EmptyPortfolioSet
    ));
}
