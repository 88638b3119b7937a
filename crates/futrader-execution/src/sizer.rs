//! 포지션 사이징.
//!
//! 거래 지시 + 계좌/포지션 스냅샷을 정규화된 base 자산 수량으로 변환합니다.
//! 진입과 청산 모두 base 수량으로 통일하고 정규화는 한 번만 거칩니다.

use rust_decimal::Decimal;
use tracing::debug;

use futrader_core::{AccountSnapshot, PositionSnapshot, SymbolTradingRules, TradeAction};

use crate::error::ExecutionError;
use crate::normalize::normalize_quantity;

/// 잔고 안전 마진 (95%).
///
/// 사이징과 체결 사이의 잔고/가격 변동에 대비해 가용 잔고 전체를 쓰지 않습니다.
fn balance_haircut() -> Decimal {
    Decimal::new(95, 2)
}

fn validate_percentage(percentage: Decimal) -> Result<(), ExecutionError> {
    if percentage < Decimal::ONE || percentage > Decimal::ONE_HUNDRED {
        return Err(ExecutionError::InvalidPercentage { percentage });
    }
    Ok(())
}

/// 진입 수량 산출.
///
/// notional = 가용 잔고 × 0.95 × (percentage/100) × leverage,
/// 수량 = notional / 마크 가격을 정규화. 정규화 결과가 최소 주문 금액에
/// 못 미치면 `step_size` 단위로 증액하여 하한을 넘깁니다.
pub fn open_quantity(
    account: &AccountSnapshot,
    percentage: Decimal,
    leverage: u32,
    mark_price: Decimal,
    rules: &SymbolTradingRules,
) -> Result<Decimal, ExecutionError> {
    validate_percentage(percentage)?;
    if mark_price <= Decimal::ZERO {
        return Err(ExecutionError::InvalidPrice { price: mark_price });
    }

    let notional = account.available_balance
        * balance_haircut()
        * (percentage / Decimal::ONE_HUNDRED)
        * Decimal::from(leverage);
    let raw = notional / mark_price;
    let mut quantity = normalize_quantity(raw, rules);

    // 최소 주문 금액 하한
    while quantity * mark_price < rules.min_notional {
        quantity += rules.step_size;
    }

    debug!(
        balance = %account.available_balance,
        %percentage,
        leverage,
        %mark_price,
        %notional,
        %quantity,
        "진입 수량 산출"
    );
    Ok(quantity)
}

/// 청산 수량 산출.
///
/// 보유 수량 × (percentage/100)을 `min_qty` 기준으로만 정규화합니다.
/// 청산은 리스크를 줄이는 방향이므로 최소 주문 금액 하한을 적용하지
/// 않습니다. 지시 방향과 일치하는 포지션이 없으면 `NoPositionToClose`.
pub fn close_quantity(
    symbol: &str,
    position: Option<&PositionSnapshot>,
    action: TradeAction,
    percentage: Decimal,
    rules: &SymbolTradingRules,
) -> Result<Decimal, ExecutionError> {
    validate_percentage(percentage)?;

    let no_position = || ExecutionError::NoPositionToClose {
        symbol: symbol.to_string(),
    };
    let position = position.filter(|p| !p.is_flat()).ok_or_else(no_position)?;

    // 반대 방향 포지션에 청산 지시가 내려오면 포지션을 키우게 되므로 거부
    let direction_matches = match action {
        TradeAction::CloseLong => position.is_long(),
        TradeAction::CloseShort => position.is_short(),
        _ => false,
    };
    if !direction_matches {
        return Err(no_position());
    }

    let raw = position.abs_quantity() * (percentage / Decimal::ONE_HUNDRED);
    let quantity = normalize_quantity(raw, rules);

    debug!(
        held = %position.abs_quantity(),
        %percentage,
        %quantity,
        "청산 수량 산출"
    );
    Ok(quantity)
}
