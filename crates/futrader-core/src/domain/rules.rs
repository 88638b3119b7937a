//! 심볼별 거래 규칙.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 거래소가 부과하는 심볼별 수치 제약.
///
/// 한 번 조회하면 프로세스 수명 동안 불변으로 취급합니다 (`RulesCache` 참조).
/// 엔진이 제출하는 모든 주문은 다음을 만족해야 합니다:
///
/// - 수량은 `step_size`의 음이 아닌 정수배이며 `min_qty` 이상
/// - 가격은 `tick_size`의 정수배
/// - 진입 주문은 수량 × 가격 ≥ `min_notional`
/// - 레버리지는 `max_leverage` 이하 (초과 요청은 하향 조정)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolTradingRules {
    /// 심볼 (예: "BTCUSDT")
    pub symbol: String,
    /// 최소 수량 증분
    pub step_size: Decimal,
    /// 최소 주문 수량
    pub min_qty: Decimal,
    /// 최소 가격 증분
    pub tick_size: Decimal,
    /// 최소 주문 금액 (quote 통화)
    pub min_notional: Decimal,
    /// 최대 레버리지
    pub max_leverage: u32,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn btcusdt() -> SymbolTradingRules {
        SymbolTradingRules {
            symbol: "BTCUSDT".to_string(),
            step_size: dec!(0.001),
            min_qty: dec!(0.001),
            tick_size: dec!(0.1),
            min_notional: dec!(100),
            max_leverage: 125,
        }
    }

    #[test]
    fn rules_roundtrip_serde() {
        let rules = btcusdt();
        let json = serde_json::to_string(&rules).unwrap();
        let back: SymbolTradingRules = serde_json::from_str(&json).unwrap();
        assert_eq!(back.step_size, rules.step_size);
        assert_eq!(back.max_leverage, 125);
    }
}
