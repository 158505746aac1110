use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontierError {
    #[error("Insufficient history: at least 2 price dates required, got {dates}")]
    InsufficientHistory { dates: usize },

    #[error("Empty portfolio set: no candidates to select from")]
    EmptyPortfolioSet,

    #[error("No valid candidate: all {candidates} Sharpe ratios are undefined")]
    NoValidCandidate { candidates: usize },

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown symbol: {0} has no price on any date")]
    UnknownSymbol(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FrontierError {
    fn from(e: serde_json::Error) -> Self {
        FrontierError::SerializationError(e.to_string())
    }
}
