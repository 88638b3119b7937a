//! `FuturesExchange` 구현체.

pub mod binance;
pub mod simulated;

pub use binance::BinanceFuturesProvider;
pub use simulated::SimulatedExchange;
