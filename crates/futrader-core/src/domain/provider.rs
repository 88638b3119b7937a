//! 선물 거래소 추상화.
//!
//! 실행 엔진이 소비하는 브로커 연산 전체를 하나의 trait으로 묶습니다.
//! 각 연산은 REST 스타일 브로커 API 위에 구현 가능해야 합니다.
//!
//! # 설계 원칙
//!
//! - **거래소 중립성**: 엔진은 `Arc<dyn FuturesExchange>`로 주입받아
//!   Binance 외 거래소로도 교체 가능
//! - **타입 있는 실패**: catch-all 예외 대신 `ExchangeError` 분류를 반환,
//!   호출측(재시도 컨트롤러, 파사드)은 에러 종류로 분기
//! - **테스트 용이성**: 테스트에서 mock 구현으로 대체 가능

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    AccountSnapshot, OrderAck, OrderId, OrderRequest, OrderUpdate, PositionSnapshot, Side,
    SymbolTradingRules,
};
use crate::error::ExchangeError;

/// 마진 모드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarginMode {
    /// 격리 마진
    Isolated,
    /// 교차 마진
    Crossed,
}

impl MarginMode {
    /// 거래소 wire 표기.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Isolated => "ISOLATED",
            Self::Crossed => "CROSSED",
        }
    }
}

/// 선물 거래소 trait.
///
/// # 구현 예시
///
/// ```ignore
/// pub struct BinanceFuturesProvider {
///     client: Arc<BinanceFuturesClient>,
/// }
///
/// #[async_trait]
/// impl FuturesExchange for BinanceFuturesProvider {
///     async fn get_mark_price(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
///         // /fapi/v1/premiumIndex 호출 및 변환
///     }
///     // ... 나머지 메서드 구현
/// }
/// ```
#[async_trait]
pub trait FuturesExchange: Send + Sync {
    /// 심볼 거래 규칙 조회.
    ///
    /// # Errors
    ///
    /// - `ExchangeError::RulesUnavailable`: 알 수 없는 심볼
    /// - `ExchangeError::Network`: 네트워크 연결 실패
    async fn get_symbol_rules(&self, symbol: &str) -> Result<SymbolTradingRules, ExchangeError>;

    /// 주문 가능 잔고 조회.
    ///
    /// 사이징 직전마다 새로 호출됩니다. 구현은 이 값을 캐시하면 안 됩니다.
    async fn get_account_balance(&self) -> Result<AccountSnapshot, ExchangeError>;

    /// 보유 포지션 조회.
    ///
    /// # Returns
    ///
    /// 수량이 0이 아닌 포지션. 무포지션이면 `None`.
    async fn get_position(&self, symbol: &str) -> Result<Option<PositionSnapshot>, ExchangeError>;

    /// 마크 가격 조회.
    async fn get_mark_price(&self, symbol: &str) -> Result<Decimal, ExchangeError>;

    /// 지정가 주문 제출.
    ///
    /// `order.price`는 `Some`이어야 하며, 수량/가격은 정규화 완료 상태여야 합니다.
    ///
    /// # Errors
    ///
    /// - `ExchangeError::InsufficientMargin`: 증거금 부족 (재시도 대상)
    /// - `ExchangeError::Rejected`: 기타 브로커 거부
    async fn place_limit_order(&self, order: &OrderRequest) -> Result<OrderAck, ExchangeError>;

    /// 시장가 주문 제출.
    async fn place_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderAck, ExchangeError>;

    /// 스톱 시장가 주문 제출 (트리거 가격 도달 시 시장가 체결).
    async fn place_stop_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        stop_price: Decimal,
    ) -> Result<OrderAck, ExchangeError>;

    /// 주문 상태 조회.
    async fn get_order_status(
        &self,
        symbol: &str,
        order_id: OrderId,
    ) -> Result<OrderUpdate, ExchangeError>;

    /// 주문 취소.
    ///
    /// # Errors
    ///
    /// - `ExchangeError::Rejected`: 이미 체결되었거나 존재하지 않는 주문
    async fn cancel_order(&self, symbol: &str, order_id: OrderId) -> Result<(), ExchangeError>;

    /// 심볼의 모든 미체결 주문 취소.
    ///
    /// 멱등합니다. 취소할 주문이 없어도 성공을 반환해야 합니다.
    async fn cancel_all_open_orders(&self, symbol: &str) -> Result<(), ExchangeError>;

    /// 레버리지 설정.
    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<(), ExchangeError>;

    /// 마진 모드 설정.
    ///
    /// 이미 해당 모드이면 성공으로 처리해야 합니다 (Binance code -4046).
    async fn set_margin_type(&self, symbol: &str, mode: MarginMode) -> Result<(), ExchangeError>;

    /// 거래소 이름 (로깅/디버깅용).
    fn exchange_name(&self) -> &str;
}
