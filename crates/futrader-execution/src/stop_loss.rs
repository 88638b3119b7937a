//! 보호 스톱 주문 부착.
//!
//! 진입 성공 직후 체결 수량 전체를 덮는 반대 방향 스톱 시장가 주문을
//! 제출합니다. 스톱 부착 실패는 전체 액션의 실패가 아니라 경고입니다:
//! 포지션은 하방 보호 없이 유지되며, 이는 명시적으로 수용된 리스크입니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use futrader_core::{ExchangeError, FuturesExchange, Side, SymbolTradingRules};

use crate::normalize::normalize_price;

/// 스톱 주문 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopLossConfig {
    /// 진입가 대비 손실 허용 폭 (%, 기본 2.5)
    pub risk_pct: Decimal,
}

impl Default for StopLossConfig {
    fn default() -> Self {
        Self {
            risk_pct: Decimal::new(25, 1), // 2.5%
        }
    }
}

/// 스톱 트리거 가격 산출.
///
/// 롱은 진입가 × (1 − risk/100), 숏은 진입가 × (1 + risk/100),
/// tick 단위로 정규화합니다.
pub fn stop_trigger_price(
    entry_price: Decimal,
    entry_side: Side,
    risk_pct: Decimal,
    rules: &SymbolTradingRules,
) -> Decimal {
    let fraction = risk_pct / Decimal::ONE_HUNDRED;
    let raw = match entry_side {
        Side::Buy => entry_price * (Decimal::ONE - fraction),
        Side::Sell => entry_price * (Decimal::ONE + fraction),
    };
    normalize_price(raw, rules)
}

/// 진입 포지션에 보호 스톱 부착.
///
/// # Returns
///
/// 제출된 스톱 트리거 가격. 실패 시 거래소 에러를 반환하며,
/// 호출측(파사드)은 이를 결과의 경고 필드로 강등합니다.
pub async fn attach_stop_loss(
    exchange: &dyn FuturesExchange,
    config: &StopLossConfig,
    symbol: &str,
    entry_side: Side,
    quantity: Decimal,
    entry_price: Decimal,
    rules: &SymbolTradingRules,
) -> Result<Decimal, ExchangeError> {
    let stop_price = stop_trigger_price(entry_price, entry_side, config.risk_pct, rules);
    let stop_side = entry_side.opposite();

    exchange
        .place_stop_market_order(symbol, stop_side, quantity, stop_price)
        .await?;

    info!(
        symbol,
        %stop_side,
        %quantity,
        %stop_price,
        risk_pct = %config.risk_pct,
        "보호 스톱 주문 부착"
    );
    Ok(stop_price)
}
