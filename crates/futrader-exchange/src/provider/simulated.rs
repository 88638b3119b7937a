//! 시뮬레이션 거래소.
//!
//! 실제 네트워크 없이 `FuturesExchange` 전체를 구현하는 페이퍼 트레이딩
//! 백엔드입니다. 통합 테스트와 전략 리허설에 사용합니다.
//!
//! # 체결 모델
//!
//! - 지정가/시장가 주문은 즉시 전량 체결 (지정가는 주문 가격, 시장가는 마크 가격)
//! - 스톱 주문은 미체결 상태로 대기 (트리거 시뮬레이션 없음)
//! - 증거금 검사: 포지션을 키우는 주문은 `수량 × 가격 / 레버리지`가
//!   잔고를 넘으면 `InsufficientMargin`으로 거부

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::Signed;
use tokio::sync::Mutex;
use tracing::debug;

use futrader_core::{
    AccountSnapshot, ExchangeError, FuturesExchange, MarginMode, OrderAck, OrderId, OrderRequest,
    OrderState, OrderUpdate, PositionSnapshot, Side, SymbolTradingRules,
};

/// 시뮬레이션 주문.
#[derive(Debug, Clone)]
struct SimOrder {
    state: OrderState,
    executed_qty: Decimal,
    avg_price: Decimal,
}

/// 내부 가변 상태.
#[derive(Debug)]
struct SimState {
    balance: Decimal,
    mark_price: Decimal,
    signed_quantity: Decimal,
    entry_price: Decimal,
    leverage: u32,
    margin_mode: MarginMode,
    orders: HashMap<OrderId, SimOrder>,
    resting: Vec<OrderId>,
    next_order_id: OrderId,
    canceled_total: u32,
}

/// 페이퍼 트레이딩용 시뮬레이션 거래소.
pub struct SimulatedExchange {
    rules: SymbolTradingRules,
    state: Mutex<SimState>,
}

impl SimulatedExchange {
    /// 규칙/잔고/마크 가격으로 생성.
    pub fn new(rules: SymbolTradingRules, balance: Decimal, mark_price: Decimal) -> Self {
        Self {
            rules,
            state: Mutex::new(SimState {
                balance,
                mark_price,
                signed_quantity: Decimal::ZERO,
                entry_price: Decimal::ZERO,
                leverage: 1,
                margin_mode: MarginMode::Crossed,
                orders: HashMap::new(),
                resting: Vec::new(),
                next_order_id: 1,
                canceled_total: 0,
            }),
        }
    }

    /// 마크 가격 갱신 (테스트 시나리오용).
    pub async fn set_mark_price(&self, price: Decimal) {
        self.state.lock().await.mark_price = price;
    }

    /// 대기 중인 주문 수.
    pub async fn open_order_count(&self) -> usize {
        self.state.lock().await.resting.len()
    }

    /// 지금까지 취소된 주문 누계.
    pub async fn canceled_total(&self) -> u32 {
        self.state.lock().await.canceled_total
    }

    /// 현재 마진 모드 (검증용).
    pub async fn margin_mode(&self) -> MarginMode {
        self.state.lock().await.margin_mode
    }

    /// 현재 레버리지 (검증용).
    pub async fn leverage(&self) -> u32 {
        self.state.lock().await.leverage
    }

    /// 체결 1건을 포지션에 반영.
    fn apply_fill(state: &mut SimState, side: Side, quantity: Decimal, price: Decimal) {
        let delta = match side {
            Side::Buy => quantity,
            Side::Sell => -quantity,
        };
        let increases = state.signed_quantity.is_zero()
            || state.signed_quantity.signum() == delta.signum();

        if increases {
            let old_abs = state.signed_quantity.abs();
            let total = old_abs + quantity;
            state.entry_price = (state.entry_price * old_abs + price * quantity) / total;
        }

        state.signed_quantity += delta;
        if state.signed_quantity.is_zero() {
            state.entry_price = Decimal::ZERO;
        }
    }

    /// 체결 주문 1건 실행 (증거금 검사 포함).
    fn execute(
        state: &mut SimState,
        side: Side,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<OrderId, ExchangeError> {
        let delta = match side {
            Side::Buy => quantity,
            Side::Sell => -quantity,
        };
        let increases = state.signed_quantity.is_zero()
            || state.signed_quantity.signum() == delta.signum();
        if increases {
            let required = quantity * price / Decimal::from(state.leverage.max(1));
            if required > state.balance {
                return Err(ExchangeError::InsufficientMargin(format!(
                    "필요 증거금 {required}, 잔고 {}",
                    state.balance
                )));
            }
        }

        Self::apply_fill(state, side, quantity, price);

        let order_id = state.next_order_id;
        state.next_order_id += 1;
        state.orders.insert(
            order_id,
            SimOrder {
                state: OrderState::Filled,
                executed_qty: quantity,
                avg_price: price,
            },
        );
        debug!(order_id, %side, %quantity, %price, "시뮬레이션 체결");
        Ok(order_id)
    }
}

#[async_trait]
impl FuturesExchange for SimulatedExchange {
    async fn get_symbol_rules(&self, symbol: &str) -> Result<SymbolTradingRules, ExchangeError> {
        if symbol != self.rules.symbol {
            return Err(ExchangeError::RulesUnavailable(format!(
                "알 수 없는 심볼: {symbol}"
            )));
        }
        Ok(self.rules.clone())
    }

    async fn get_account_balance(&self) -> Result<AccountSnapshot, ExchangeError> {
        Ok(AccountSnapshot {
            available_balance: self.state.lock().await.balance,
        })
    }

    async fn get_position(&self, symbol: &str) -> Result<Option<PositionSnapshot>, ExchangeError> {
        let state = self.state.lock().await;
        if state.signed_quantity.is_zero() {
            return Ok(None);
        }
        let unrealized = (state.mark_price - state.entry_price) * state.signed_quantity;
        Ok(Some(PositionSnapshot {
            symbol: symbol.to_string(),
            signed_quantity: state.signed_quantity,
            entry_price: state.entry_price,
            unrealized_pnl: unrealized,
        }))
    }

    async fn get_mark_price(&self, _symbol: &str) -> Result<Decimal, ExchangeError> {
        Ok(self.state.lock().await.mark_price)
    }

    async fn place_limit_order(&self, order: &OrderRequest) -> Result<OrderAck, ExchangeError> {
        let price = order.price.ok_or(ExchangeError::Rejected {
            code: -1102,
            message: "지정가 주문에 price가 없습니다".to_string(),
        })?;
        let mut state = self.state.lock().await;
        let order_id = Self::execute(&mut state, order.side, order.quantity, price)?;
        Ok(OrderAck { order_id })
    }

    async fn place_market_order(
        &self,
        _symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderAck, ExchangeError> {
        let mut state = self.state.lock().await;
        let mark = state.mark_price;
        let order_id = Self::execute(&mut state, side, quantity, mark)?;
        Ok(OrderAck { order_id })
    }

    async fn place_stop_market_order(
        &self,
        _symbol: &str,
        _side: Side,
        quantity: Decimal,
        stop_price: Decimal,
    ) -> Result<OrderAck, ExchangeError> {
        let mut state = self.state.lock().await;
        let order_id = state.next_order_id;
        state.next_order_id += 1;
        state.orders.insert(
            order_id,
            SimOrder {
                state: OrderState::New,
                executed_qty: Decimal::ZERO,
                avg_price: Decimal::ZERO,
            },
        );
        state.resting.push(order_id);
        debug!(order_id, %quantity, %stop_price, "시뮬레이션 스톱 주문 대기");
        Ok(OrderAck { order_id })
    }

    async fn get_order_status(
        &self,
        _symbol: &str,
        order_id: OrderId,
    ) -> Result<OrderUpdate, ExchangeError> {
        let state = self.state.lock().await;
        let order = state.orders.get(&order_id).ok_or(ExchangeError::Rejected {
            code: -2013,
            message: "Order does not exist.".to_string(),
        })?;
        Ok(OrderUpdate {
            order_id,
            state: order.state,
            executed_qty: order.executed_qty,
            avg_price: order.avg_price,
        })
    }

    async fn cancel_order(&self, _symbol: &str, order_id: OrderId) -> Result<(), ExchangeError> {
        let mut state = self.state.lock().await;
        let Some(position) = state.resting.iter().position(|id| *id == order_id) else {
            return Err(ExchangeError::Rejected {
                code: -2011,
                message: "Unknown order sent.".to_string(),
            });
        };
        state.resting.remove(position);
        if let Some(order) = state.orders.get_mut(&order_id) {
            order.state = OrderState::Canceled;
        }
        state.canceled_total += 1;
        Ok(())
    }

    async fn cancel_all_open_orders(&self, _symbol: &str) -> Result<(), ExchangeError> {
        let mut state = self.state.lock().await;
        let resting = std::mem::take(&mut state.resting);
        state.canceled_total += resting.len() as u32;
        for order_id in resting {
            if let Some(order) = state.orders.get_mut(&order_id) {
                order.state = OrderState::Canceled;
            }
        }
        Ok(())
    }

    async fn set_leverage(&self, _symbol: &str, leverage: u32) -> Result<(), ExchangeError> {
        if leverage == 0 || leverage > self.rules.max_leverage {
            return Err(ExchangeError::Rejected {
                code: -4028,
                message: format!("Leverage {leverage} is not valid"),
            });
        }
        self.state.lock().await.leverage = leverage;
        Ok(())
    }

    async fn set_margin_type(&self, _symbol: &str, mode: MarginMode) -> Result<(), ExchangeError> {
        self.state.lock().await.margin_mode = mode;
        Ok(())
    }

    fn exchange_name(&self) -> &str {
        "SimulatedExchange"
    }
}
