//! 수량/가격 정규화.
//!
//! 거래소가 허용하는 증분(step/tick)으로 원시 수치를 스냅하는 순수 함수.
//! 부동소수점 반올림 오차가 곧 주문 거부인 영역이므로 전 구간
//! `Decimal` 연산만 사용합니다.

use rust_decimal::{Decimal, RoundingStrategy};

use futrader_core::SymbolTradingRules;

/// 수량 정규화.
///
/// `raw`를 `step_size`의 가장 가까운 아래쪽 배수로 내림하고,
/// 결과가 `min_qty` 미만이면 `min_qty`로 올립니다.
pub fn normalize_quantity(raw: Decimal, rules: &SymbolTradingRules) -> Decimal {
    let stepped = (raw / rules.step_size).floor() * rules.step_size;
    let stepped = stepped.normalize();
    if stepped < rules.min_qty {
        rules.min_qty
    } else {
        stepped
    }
}

/// 가격 정규화.
///
/// `raw`를 `tick_size`의 가장 가까운 배수로 반올림합니다 (동률은 올림).
/// 지정가와 스톱 트리거 가격 양쪽에 사용됩니다.
pub fn normalize_price(raw: Decimal, rules: &SymbolTradingRules) -> Decimal {
    let ticks = (raw / rules.tick_size)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    (ticks * rules.tick_size).normalize()
}
