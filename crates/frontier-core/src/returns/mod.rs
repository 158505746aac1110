pub mod engine;
pub mod prices;
pub mod provider;
pub mod summary;

pub use engine::{calculate_returns, compute_returns, ReturnRow, ReturnTable, ReturnsInput, ReturnsOutput};
pub use prices::{HistoryWindow, PriceTable, ReturnsConfig};
pub use provider::PriceProvider;
pub use summary::{covariance_matrix, summarise_returns, AssetSummary, CovarianceMatrix, ReturnFrequency};
