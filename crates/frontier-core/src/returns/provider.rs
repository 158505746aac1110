use super::prices::{PriceTable, ReturnsConfig};
use crate::FrontierResult;

/// Source of adjusted closing prices for a configured symbol set and window.
///
/// Implementations must return dividend- and split-adjusted prices.
pub trait PriceProvider {
    fn fetch(&self, config: &ReturnsConfig) -> FrontierResult<PriceTable>;
}

/// An in-memory table serves as its own provider.
impl PriceProvider for PriceTable {
    fn fetch(&self, config: &ReturnsConfig) -> FrontierResult<PriceTable> {
        self.select(&config.symbols).within(config.window)
    }
}
