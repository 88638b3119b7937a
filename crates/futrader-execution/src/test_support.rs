//! 테스트 공용 스크립트 거래소.
//!
//! 주문 상태 응답 시퀀스를 미리 스크립트해 두고, 모든 거래소 호출을
//! 기록하는 mock 구현입니다. 생명주기/재시도/엔진 테스트에서 공유합니다.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use futrader_core::{
    AccountSnapshot, ExchangeError, FuturesExchange, MarginMode, OrderAck, OrderId, OrderRequest,
    OrderState, OrderUpdate, PositionSnapshot, Side, SymbolTradingRules,
};

/// 거래소 호출 기록.
#[derive(Debug, Default)]
pub(crate) struct CallLog {
    pub limit_orders: Vec<OrderRequest>,
    pub market_orders: Vec<(Side, Decimal)>,
    pub stop_orders: Vec<(Side, Decimal, Decimal)>,
    pub cancels: Vec<OrderId>,
    pub cancel_all_calls: u32,
    pub status_polls: u32,
    pub set_leverage: Vec<u32>,
    pub set_margin_calls: u32,
    pub balance_fetches: u32,
    pub position_fetches: u32,
    pub mark_fetches: u32,
    pub rules_fetches: u32,
}

impl CallLog {
    /// 거래소 호출이 전혀 없었는지 확인 (Hold 검증용).
    pub fn is_empty(&self) -> bool {
        self.limit_orders.is_empty()
            && self.market_orders.is_empty()
            && self.stop_orders.is_empty()
            && self.cancels.is_empty()
            && self.cancel_all_calls == 0
            && self.status_polls == 0
            && self.set_leverage.is_empty()
            && self.set_margin_calls == 0
            && self.balance_fetches == 0
            && self.position_fetches == 0
            && self.mark_fetches == 0
            && self.rules_fetches == 0
    }
}

/// 스크립트 기반 mock 거래소.
pub(crate) struct ScriptedExchange {
    pub rules: SymbolTradingRules,
    pub balance: Decimal,
    pub mark_price: Decimal,
    pub position: Option<PositionSnapshot>,
    /// 지정가 주문 제출 응답 시퀀스 (비면 Ok)
    pub limit_results: Mutex<VecDeque<Result<OrderAck, ExchangeError>>>,
    /// 지정가 주문 상태 폴링 응답 시퀀스 (비면 New)
    pub status_script: Mutex<VecDeque<Result<OrderUpdate, ExchangeError>>>,
    pub market_error: Option<ExchangeError>,
    pub stop_error: Option<ExchangeError>,
    pub cancel_error: Option<ExchangeError>,
    pub rules_error: Option<ExchangeError>,
    /// 시장가 체결 가격 (기본: 마크 가격)
    pub market_avg_price: Decimal,
    pub log: Mutex<CallLog>,
    next_market_id: Mutex<OrderId>,
    market_fills: Mutex<HashMap<OrderId, (Decimal, Decimal)>>,
}

pub(crate) fn btcusdt_rules() -> SymbolTradingRules {
    SymbolTradingRules {
        symbol: "BTCUSDT".to_string(),
        step_size: dec!(0.001),
        min_qty: dec!(0.001),
        tick_size: dec!(0.1),
        min_notional: dec!(100),
        max_leverage: 125,
    }
}

/// 상태 응답 한 건 생성 (지정가 주문 id 1 기준).
pub(crate) fn update(state: OrderState, executed_qty: Decimal, avg_price: Decimal) -> OrderUpdate {
    OrderUpdate {
        order_id: 1,
        state,
        executed_qty,
        avg_price,
    }
}

impl ScriptedExchange {
    pub fn new() -> Self {
        Self {
            rules: btcusdt_rules(),
            balance: dec!(1000),
            mark_price: dec!(50000),
            position: None,
            limit_results: Mutex::new(VecDeque::new()),
            status_script: Mutex::new(VecDeque::new()),
            market_error: None,
            stop_error: None,
            cancel_error: None,
            rules_error: None,
            market_avg_price: dec!(50000),
            log: Mutex::new(CallLog::default()),
            next_market_id: Mutex::new(1000),
            market_fills: Mutex::new(HashMap::new()),
        }
    }

    pub fn script_status(&self, updates: impl IntoIterator<Item = Result<OrderUpdate, ExchangeError>>) {
        self.status_script.lock().unwrap().extend(updates);
    }

    pub fn script_limit_results(
        &self,
        results: impl IntoIterator<Item = Result<OrderAck, ExchangeError>>,
    ) {
        self.limit_results.lock().unwrap().extend(results);
    }
}

#[async_trait]
impl FuturesExchange for ScriptedExchange {
    async fn get_symbol_rules(&self, _symbol: &str) -> Result<SymbolTradingRules, ExchangeError> {
        self.log.lock().unwrap().rules_fetches += 1;
        if let Some(error) = &self.rules_error {
            return Err(error.clone());
        }
        Ok(self.rules.clone())
    }

    async fn get_account_balance(&self) -> Result<AccountSnapshot, ExchangeError> {
        self.log.lock().unwrap().balance_fetches += 1;
        Ok(AccountSnapshot {
            available_balance: self.balance,
        })
    }

    async fn get_position(&self, _symbol: &str) -> Result<Option<PositionSnapshot>, ExchangeError> {
        self.log.lock().unwrap().position_fetches += 1;
        Ok(self.position.clone())
    }

    async fn get_mark_price(&self, _symbol: &str) -> Result<Decimal, ExchangeError> {
        self.log.lock().unwrap().mark_fetches += 1;
        Ok(self.mark_price)
    }

    async fn place_limit_order(&self, order: &OrderRequest) -> Result<OrderAck, ExchangeError> {
        self.log.lock().unwrap().limit_orders.push(order.clone());
        self.limit_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(OrderAck { order_id: 1 }))
    }

    async fn place_market_order(
        &self,
        _symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderAck, ExchangeError> {
        self.log.lock().unwrap().market_orders.push((side, quantity));
        if let Some(error) = &self.market_error {
            return Err(error.clone());
        }
        let mut next_id = self.next_market_id.lock().unwrap();
        let order_id = *next_id;
        *next_id += 1;
        self.market_fills
            .lock()
            .unwrap()
            .insert(order_id, (quantity, self.market_avg_price));
        Ok(OrderAck { order_id })
    }

    async fn place_stop_market_order(
        &self,
        _symbol: &str,
        side: Side,
        quantity: Decimal,
        stop_price: Decimal,
    ) -> Result<OrderAck, ExchangeError> {
        self.log
            .lock()
            .unwrap()
            .stop_orders
            .push((side, quantity, stop_price));
        if let Some(error) = &self.stop_error {
            return Err(error.clone());
        }
        Ok(OrderAck { order_id: 5000 })
    }

    async fn get_order_status(
        &self,
        _symbol: &str,
        order_id: OrderId,
    ) -> Result<OrderUpdate, ExchangeError> {
        self.log.lock().unwrap().status_polls += 1;
        if let Some((quantity, avg_price)) = self.market_fills.lock().unwrap().get(&order_id) {
            return Ok(OrderUpdate {
                order_id,
                state: OrderState::Filled,
                executed_qty: *quantity,
                avg_price: *avg_price,
            });
        }
        self.status_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(OrderUpdate {
                    order_id,
                    state: OrderState::New,
                    executed_qty: Decimal::ZERO,
                    avg_price: Decimal::ZERO,
                })
            })
    }

    async fn cancel_order(&self, _symbol: &str, order_id: OrderId) -> Result<(), ExchangeError> {
        self.log.lock().unwrap().cancels.push(order_id);
        match &self.cancel_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn cancel_all_open_orders(&self, _symbol: &str) -> Result<(), ExchangeError> {
        self.log.lock().unwrap().cancel_all_calls += 1;
        Ok(())
    }

    async fn set_leverage(&self, _symbol: &str, leverage: u32) -> Result<(), ExchangeError> {
        self.log.lock().unwrap().set_leverage.push(leverage);
        Ok(())
    }

    async fn set_margin_type(&self, _symbol: &str, _mode: MarginMode) -> Result<(), ExchangeError> {
        self.log.lock().unwrap().set_margin_calls += 1;
        Ok(())
    }

    fn exchange_name(&self) -> &str {
        "ScriptedExchange"
    }
}
