use clap::Args;
use serde_json::Value;

use frontier_core::frontier::{self, FrontierInput, FrontierView, PortfolioSet};

use crate::input;
use crate::output;

/// Arguments for max-Sharpe frontier selection
#[derive(Args)]
pub struct FrontierArgs {
    /// Path to the portfolio set: CSV with vol/ret/sharpe columns, or JSON
    #[arg(long)]
    pub input: Option<String>,

    /// Write the render-ready view (every portfolio plus the max-Sharpe row) as JSON
    #[arg(long)]
    pub view: Option<String>,
}

fn load_portfolios(args: &FrontierArgs) -> Result<PortfolioSet, Box<dyn std::error::Error>> {
    match args.input {
        Some(ref path) if input::file::has_extension(path, &["json"]) => {
            let data = input::file::read_json_value(path)?;
            if data.is_array() {
                Ok(serde_json::from_value(data)?)
            } else {
                let parsed: FrontierInput = serde_json::from_value(data)?;
                Ok(parsed.portfolios)
            }
        }
        Some(ref path) => {
            let reader = input::file::open(path)?;
            Ok(input::csv_in::read_portfolio_set(reader)?)
        }
        None => match input::stdin::read_stdin::<FrontierInput>()? {
            Some(parsed) => Ok(parsed.portfolios),
            None => Err("Provide --input <portfolios.csv|json> or pipe JSON via stdin".into()),
        },
    }
}

pub fn run_frontier(args: FrontierArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolios = load_portfolios(&args)?;
    tracing::debug!(candidates = portfolios.len(), "loaded portfolio set");

    let frontier_input = FrontierInput { portfolios };
    let result = frontier::analyse_frontier(&frontier_input)?;

    if let Some(ref path) = args.view {
        let view = FrontierView::new(&frontier_input.portfolios)?;
        output::file::write_json(path, &view)?;
        tracing::info!(path = %path, "wrote frontier view");
    }

    Ok(serde_json::to_value(result)?)
}
