//! Binance USDT-M 선물 REST 커넥터.

pub mod client;
pub mod types;

pub use client::BinanceFuturesClient;
