//! 거래 지시 타입.
//!
//! 상위 자문 컴포넌트(지표 분석, LLM 판단 등)가 발행하는 고수준 지시입니다.
//! 엔진은 지시의 생성 과정을 알지 못하며, `reason`은 로깅 외에 해석하지 않습니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Side;

/// 포지션 액션.
///
/// 자문 컴포넌트의 JSON 출력(`"open_long"` 등)과 1:1로 대응합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeAction {
    /// 롱 진입 (또는 기존 롱 증액)
    OpenLong,
    /// 숏 진입 (또는 기존 숏 증액)
    OpenShort,
    /// 롱 청산 (부분 또는 전체)
    CloseLong,
    /// 숏 청산 (부분 또는 전체)
    CloseShort,
    /// 포지션 유지, 주문 없음
    Hold,
}

impl TradeAction {
    /// 신규 진입 액션 여부.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::OpenLong | Self::OpenShort)
    }

    /// 청산 액션 여부.
    pub fn is_close(&self) -> bool {
        matches!(self, Self::CloseLong | Self::CloseShort)
    }

    /// 이 액션이 제출하는 주문의 방향.
    ///
    /// Hold는 주문을 만들지 않으므로 `None`.
    pub fn order_side(&self) -> Option<Side> {
        match self {
            Self::OpenLong | Self::CloseShort => Some(Side::Buy),
            Self::OpenShort | Self::CloseLong => Some(Side::Sell),
            Self::Hold => None,
        }
    }
}

/// 거래 지시.
///
/// # 필드 제약
///
/// - `percentage`: 1~100. 진입이면 가용 잔고 대비, 청산이면 보유 수량 대비 비중.
/// - `leverage`: 진입 액션에만 의미가 있습니다. 거래소 최대 레버리지를
///   초과하면 엔진이 하향 조정합니다 (에러가 아닌 제약으로 처리).
/// - `reason`: 자문 컴포넌트의 판단 근거. 엔진은 로깅에만 사용합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingInstruction {
    /// 포지션 액션
    pub action: TradeAction,
    /// 사용 비중 (1~100, %)
    pub percentage: Decimal,
    /// 레버리지 배수 (진입 액션 전용)
    #[serde(default)]
    pub leverage: Option<u32>,
    /// 판단 근거 (로깅 전용, 해석하지 않음)
    #[serde(default)]
    pub reason: String,
}

impl TradingInstruction {
    /// 새 거래 지시 생성.
    pub fn new(action: TradeAction, percentage: Decimal) -> Self {
        Self {
            action,
            percentage,
            leverage: None,
            reason: String::new(),
        }
    }

    /// 레버리지 설정.
    pub fn with_leverage(mut self, leverage: u32) -> Self {
        self.leverage = Some(leverage);
        self
    }

    /// 판단 근거 설정.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Hold 지시 생성 (percentage 무의미).
    pub fn hold() -> Self {
        Self::new(TradeAction::Hold, Decimal::ZERO)
    }
}
