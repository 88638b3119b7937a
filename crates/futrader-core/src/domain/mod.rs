//! 도메인 타입 모듈.

pub mod account;
pub mod instruction;
pub mod order;
pub mod provider;
pub mod report;
pub mod rules;

pub use account::{AccountSnapshot, PositionSnapshot};
pub use instruction::{TradeAction, TradingInstruction};
pub use order::{OrderAck, OrderId, OrderRequest, OrderState, OrderUpdate, Side, TimeInForce};
pub use provider::{FuturesExchange, MarginMode};
pub use report::{ExecutionReport, ExecutionStatus};
pub use rules::SymbolTradingRules;
