//! 선물 주문 실행 엔진의 거래소 중립 도메인.
//!
//! 이 crate는 다음을 제공합니다:
//! - 거래 지시/계좌/포지션/주문/결과 도메인 타입
//! - 거래소 추상화 trait (`FuturesExchange`)
//! - 거래소 에러 분류 (`ExchangeError`)
//! - 심볼 거래 규칙 캐시 (`RulesCache`)

pub mod domain;
pub mod error;
pub mod rules_cache;

// 주요 타입 재내보내기
pub use domain::{
    AccountSnapshot, ExecutionReport, ExecutionStatus, FuturesExchange, MarginMode, OrderAck,
    OrderId, OrderRequest, OrderState, OrderUpdate, PositionSnapshot, Side, SymbolTradingRules,
    TimeInForce, TradeAction, TradingInstruction,
};
pub use error::ExchangeError;
pub use rules_cache::RulesCache;
