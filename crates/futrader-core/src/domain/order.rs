//! 주문 요청 / 상태 타입.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 거래소가 부여하는 주문 번호.
pub type OrderId = u64;

/// 주문 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// 반대 방향.
    ///
    /// 보호 스톱 주문은 항상 진입의 반대 방향으로 제출됩니다.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// 주문 유효 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good Till Canceled
    Gtc,
    /// Immediate Or Cancel
    Ioc,
    /// Fill Or Kill
    Fok,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gtc => write!(f, "GTC"),
            Self::Ioc => write!(f, "IOC"),
            Self::Fok => write!(f, "FOK"),
        }
    }
}

/// 주문 요청.
///
/// `price`가 `Some`이면 지정가, `None`이면 시장가 의미로 사용됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    /// 심볼
    pub symbol: String,
    /// 방향
    pub side: Side,
    /// 수량 (base 자산, 정규화 완료 상태여야 함)
    pub quantity: Decimal,
    /// 지정가 (시장가 주문이면 None)
    pub price: Option<Decimal>,
    /// 유효 기간
    pub time_in_force: TimeInForce,
}

/// 주문 제출 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAck {
    /// 거래소가 부여한 주문 번호
    pub order_id: OrderId,
}

/// 주문 상태.
///
/// 한 번의 생명주기 실행 동안만 존재하는 일시적 상태입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderState {
    /// 접수됨, 미체결
    New,
    /// 부분 체결
    PartiallyFilled,
    /// 전량 체결
    Filled,
    /// 취소됨
    Canceled,
}

/// 주문 상태 조회 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdate {
    /// 주문 번호
    pub order_id: OrderId,
    /// 현재 상태
    pub state: OrderState,
    /// 누적 체결 수량
    pub executed_qty: Decimal,
    /// 체결 평균가 (미체결이면 0)
    pub avg_price: Decimal,
}

impl OrderUpdate {
    /// 체결이 하나라도 있는지 여부.
    pub fn has_fill(&self) -> bool {
        self.executed_qty > Decimal::ZERO
    }
}
