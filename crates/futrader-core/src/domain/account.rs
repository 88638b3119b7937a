//! 계좌 / 포지션 스냅샷.
//!
//! 두 타입 모두 사이징 직전에 거래소에서 새로 조회한 값입니다.
//! 사이클을 넘겨 캐시하지 않습니다. 거래소 측 상태가 유일한 진실이며,
//! 엔진은 호출 간 read-after-write 일관성을 가정하지 않습니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 선물 계좌 스냅샷.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// 주문 가능 잔고 (quote 통화, USDT)
    pub available_balance: Decimal,
}

/// 포지션 스냅샷.
///
/// `signed_quantity`가 양수면 롱, 음수면 숏, 0이면 무포지션입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// 심볼
    pub symbol: String,
    /// 부호 있는 보유 수량 (base 자산)
    pub signed_quantity: Decimal,
    /// 평균 진입가
    pub entry_price: Decimal,
    /// 미실현 손익 (quote 통화)
    pub unrealized_pnl: Decimal,
}

impl PositionSnapshot {
    /// 무포지션 여부.
    pub fn is_flat(&self) -> bool {
        self.signed_quantity.is_zero()
    }

    /// 롱 포지션 여부.
    pub fn is_long(&self) -> bool {
        self.signed_quantity > Decimal::ZERO
    }

    /// 숏 포지션 여부.
    pub fn is_short(&self) -> bool {
        self.signed_quantity < Decimal::ZERO
    }

    /// 보유 수량의 절대값.
    pub fn abs_quantity(&self) -> Decimal {
        self.signed_quantity.abs()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn position_direction_helpers() {
        let long = PositionSnapshot {
            symbol: "BTCUSDT".to_string(),
            signed_quantity: dec!(0.2),
            entry_price: dec!(50000),
            unrealized_pnl: dec!(12.5),
        };
        assert!(long.is_long());
        assert!(!long.is_short());
        assert!(!long.is_flat());
        assert_eq!(long.abs_quantity(), dec!(0.2));

        let short = PositionSnapshot {
            symbol: "BTCUSDT".to_string(),
            signed_quantity: dec!(-0.35),
            entry_price: dec!(48000),
            unrealized_pnl: dec!(-3),
        };
        assert!(short.is_short());
        assert_eq!(short.abs_quantity(), dec!(0.35));

        let flat = PositionSnapshot {
            symbol: "BTCUSDT".to_string(),
            signed_quantity: Decimal::ZERO,
            entry_price: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
        };
        assert!(flat.is_flat());
    }
}
