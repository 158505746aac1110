use clap::Args;
use serde_json::Value;

use frontier_core::returns::{
    self, HistoryWindow, PriceProvider, ReturnFrequency, ReturnsConfig, ReturnsInput,
};

use crate::input;
use crate::input::csv_in::CsvPriceFile;
use crate::output;

/// Arguments for daily return computation
#[derive(Args)]
pub struct ReturnsArgs {
    /// Path to a wide CSV of adjusted closes (date,SYM1,SYM2,...)
    #[arg(long)]
    pub prices: Option<String>,

    /// Path to a JSON file with `prices` and `config` (overrides other flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON/YAML file with `symbols` and `window` (overrides --symbols/--window)
    #[arg(long)]
    pub config: Option<String>,

    /// Comma-separated symbols in output order (default: every price column)
    #[arg(long, value_delimiter = ',')]
    pub symbols: Option<Vec<String>>,

    /// Historical window back from the latest date: e.g. 30d, 6mo, 2y, max
    #[arg(long, default_value = "2y")]
    pub window: HistoryWindow,

    /// Return frequency for the annualised summary: daily, weekly, monthly, quarterly, annual
    #[arg(long, default_value = "daily")]
    pub frequency: String,

    /// Write the return table as CSV (date column first) to this path
    #[arg(long)]
    pub out: Option<String>,
}

fn parse_frequency(frequency: &str) -> Result<ReturnFrequency, Box<dyn std::error::Error>> {
    match frequency.to_lowercase().as_str() {
        "daily" => Ok(ReturnFrequency::Daily),
        "weekly" => Ok(ReturnFrequency::Weekly),
        "monthly" => Ok(ReturnFrequency::Monthly),
        "quarterly" => Ok(ReturnFrequency::Quarterly),
        "annual" | "annually" => Ok(ReturnFrequency::Annual),
        _ => Err(format!(
            "Unknown frequency '{}'. Use: daily, weekly, monthly, quarterly, annual",
            frequency
        )
        .into()),
    }
}

fn build_input(args: &ReturnsArgs) -> Result<ReturnsInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    let Some(ref path) = args.prices else {
        return match input::stdin::read_stdin::<ReturnsInput>()? {
            Some(parsed) => Ok(parsed),
            None => Err("Provide --prices <file.csv>, --input <file.json>, or pipe JSON via stdin".into()),
        };
    };

    let provider = CsvPriceFile::new(path.clone());
    let (config, prices) = match (&args.config, &args.symbols) {
        (Some(cfg_path), _) => {
            let config: ReturnsConfig = input::file::read_config(cfg_path)?;
            let prices = provider.fetch(&config)?;
            (config, prices)
        }
        (None, Some(symbols)) => {
            let config = ReturnsConfig {
                symbols: symbols.clone(),
                window: args.window,
            };
            let prices = provider.fetch(&config)?;
            (config, prices)
        }
        (None, None) => {
            let (columns, table) = provider.load()?;
            let config = ReturnsConfig {
                symbols: columns,
                window: args.window,
            };
            let prices = table.fetch(&config)?;
            (config, prices)
        }
    };

    Ok(ReturnsInput {
        prices,
        config,
        frequency: parse_frequency(&args.frequency)?,
    })
}

pub fn run_returns(args: ReturnsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let returns_input = build_input(&args)?;
    let result = returns::calculate_returns(&returns_input)?;

    if let Some(ref path) = args.out {
        output::file::write_returns_csv(path, &result.result.returns)?;
        tracing::info!(path = %path, rows = result.result.returns.len(), "wrote returns");
    }

    Ok(serde_json::to_value(result)?)
}
