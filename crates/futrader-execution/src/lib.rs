//! 주문 실행 엔진.
//!
//! 고수준 거래 지시(방향, 자본 비중, 레버리지)를 거래소 규격에 맞는
//! 주문으로 변환하고, 지정가 → 폴링 → 시장가 전환 생명주기로 완주시키며,
//! 증거금 거부를 복구하고, 신규 포지션에 보호 스톱을 부착합니다.
//!
//! # 아키텍처
//!
//! ```text
//! TradingInstruction
//!        │
//!        ▼
//! ╔══════════════════════════════════════════════╗
//! ║  ExecutionEngine (파사드)                    ║
//! ╠══════════════════════════════════════════════╣
//! ║  1. 미체결 주문 정리  (cancel_all)           ║
//! ║  2. 잔고/포지션/마크 가격 스냅샷             ║
//! ║  3. sizer  → 정규화된 수량                   ║
//! ║  4. retry ⊃ lifecycle (지정가→폴링→시장가)   ║
//! ║  5. stop_loss (진입 성공 시)                 ║
//! ╚══════════════════════════════════════════════╝
//!        │
//!        ▼
//! ExecutionReport (모든 경로가 이 타입으로 종결)
//! ```

pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod normalize;
pub mod retry;
pub mod sizer;
pub mod stop_loss;

#[cfg(test)]
pub(crate) mod test_support;

// 주요 타입 재내보내기
pub use engine::{EngineConfig, ExecutionEngine};
pub use error::ExecutionError;
pub use lifecycle::{LifecycleConfig, LifecycleOutcome, OrderLifecycle};
pub use normalize::{normalize_price, normalize_quantity};
pub use retry::{with_margin_retry, RetryPolicy};
pub use stop_loss::{attach_stop_loss, stop_trigger_price, StopLossConfig};
