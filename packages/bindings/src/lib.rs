use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use frontier_core::frontier::{self, FrontierInput, FrontierView, PortfolioSet};
use frontier_core::returns::{self, PriceTable, ReturnsInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Deserialize)]
struct ComputeReturnsRequest {
    prices: PriceTable,
    assets: Vec<String>,
}

// ---------------------------------------------------------------------------
// Returns
// ---------------------------------------------------------------------------

/// `{ prices, assets }` -> bare return table.
#[napi]
pub fn compute_returns(input_json: String) -> NapiResult<String> {
    let request: ComputeReturnsRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let table =
        returns::compute_returns(&request.prices, &request.assets).map_err(to_napi_error)?;
    serde_json::to_string(&table).map_err(to_napi_error)
}

#[napi]
pub fn calculate_returns(input_json: String) -> NapiResult<String> {
    let input: ReturnsInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = returns::calculate_returns(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Frontier
// ---------------------------------------------------------------------------

/// Portfolio array -> `{ portfolios, optimal: { index, record } }`.
#[napi]
pub fn select_optimal(portfolios_json: String) -> NapiResult<String> {
    let portfolios: PortfolioSet =
        serde_json::from_str(&portfolios_json).map_err(to_napi_error)?;
    let view = FrontierView::new(&portfolios).map_err(to_napi_error)?;
    serde_json::to_string(&view).map_err(to_napi_error)
}

#[napi]
pub fn analyse_frontier(input_json: String) -> NapiResult<String> {
    let input: FrontierInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = frontier::analyse_frontier(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
