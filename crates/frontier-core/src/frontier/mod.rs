pub mod portfolio;
pub mod selector;

pub use portfolio::{AssetWeight, PortfolioRecord, PortfolioSet};
pub use selector::{analyse_frontier, select_optimal, FrontierInput, FrontierReport, FrontierView, OptimalSelection};
