//! Binance 선물 `FuturesExchange` 구현.
//!
//! `BinanceFuturesClient`를 래핑하여 거래소 중립 인터페이스를 제공합니다.
//!
//! # 아키텍처
//!
//! ```text
//! BinanceFuturesProvider
//! ├── 규칙     : exchangeInfo 필터 + leverageBracket → SymbolTradingRules
//! ├── 스냅샷   : account/positionRisk → AccountSnapshot / PositionSnapshot
//! ├── 주문     : order 계열 엔드포인트 → OrderAck / OrderUpdate
//! └── 계정 설정: leverage / marginType (-4046은 성공으로 수용)
//! ```

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use futrader_core::{
    AccountSnapshot, ExchangeError, FuturesExchange, MarginMode, OrderAck, OrderId, OrderRequest,
    OrderState, OrderUpdate, PositionSnapshot, Side, SymbolTradingRules,
};

use crate::connector::binance::types::{OrderStatusInfo, SymbolFilter};
use crate::connector::binance::BinanceFuturesClient;
use crate::config::BinanceFuturesConfig;

/// Binance 주문 상태 문자열 → `OrderState` 변환.
fn parse_order_state(status: &str) -> Result<OrderState, ExchangeError> {
    match status {
        "NEW" => Ok(OrderState::New),
        "PARTIALLY_FILLED" => Ok(OrderState::PartiallyFilled),
        "FILLED" => Ok(OrderState::Filled),
        "CANCELED" | "EXPIRED" => Ok(OrderState::Canceled),
        other => Err(ExchangeError::Parse(format!(
            "알 수 없는 주문 상태: {other}"
        ))),
    }
}

/// 주문 조회 응답 → `OrderUpdate` 변환.
fn to_order_update(info: OrderStatusInfo) -> Result<OrderUpdate, ExchangeError> {
    Ok(OrderUpdate {
        order_id: info.order_id,
        state: parse_order_state(&info.status)?,
        executed_qty: info.executed_qty,
        avg_price: info.avg_price,
    })
}

/// Binance 선물 `FuturesExchange` 구현체.
pub struct BinanceFuturesProvider {
    client: BinanceFuturesClient,
}

impl BinanceFuturesProvider {
    /// 클라이언트로 생성.
    pub fn new(client: BinanceFuturesClient) -> Self {
        Self { client }
    }

    /// 설정으로 생성.
    pub fn from_config(config: BinanceFuturesConfig) -> Self {
        Self::new(BinanceFuturesClient::new(config))
    }
}

#[async_trait]
impl FuturesExchange for BinanceFuturesProvider {
    async fn get_symbol_rules(&self, symbol: &str) -> Result<SymbolTradingRules, ExchangeError> {
        let info = self.client.get_exchange_info(symbol).await?;
        let symbol_info = info
            .symbols
            .into_iter()
            .find(|s| s.symbol == symbol)
            .ok_or_else(|| {
                ExchangeError::RulesUnavailable(format!("알 수 없는 심볼: {symbol}"))
            })?;

        let mut tick_size = None;
        let mut step_size = None;
        let mut min_qty = None;
        let mut min_notional = None;
        for filter in symbol_info.filters {
            match filter {
                SymbolFilter::PriceFilter { tick_size: tick } => tick_size = Some(tick),
                SymbolFilter::LotSize {
                    step_size: step,
                    min_qty: min,
                } => {
                    step_size = Some(step);
                    min_qty = Some(min);
                }
                SymbolFilter::MinNotional { notional } => min_notional = Some(notional),
                SymbolFilter::Other => {}
            }
        }

        let missing =
            |name: &str| ExchangeError::Parse(format!("{symbol} 필터 누락: {name}"));

        let max_leverage = self
            .client
            .get_leverage_brackets(symbol)
            .await?
            .iter()
            .find(|entry| entry.symbol == symbol)
            .and_then(|entry| entry.brackets.iter().map(|b| b.initial_leverage).max())
            .ok_or_else(|| {
                ExchangeError::RulesUnavailable(format!("{symbol} 레버리지 구간 정보 없음"))
            })?;

        Ok(SymbolTradingRules {
            symbol: symbol.to_string(),
            step_size: step_size.ok_or_else(|| missing("LOT_SIZE.stepSize"))?,
            min_qty: min_qty.ok_or_else(|| missing("LOT_SIZE.minQty"))?,
            tick_size: tick_size.ok_or_else(|| missing("PRICE_FILTER.tickSize"))?,
            min_notional: min_notional.ok_or_else(|| missing("MIN_NOTIONAL.notional"))?,
            max_leverage,
        })
    }

    async fn get_account_balance(&self) -> Result<AccountSnapshot, ExchangeError> {
        let account = self.client.get_account().await?;
        Ok(AccountSnapshot {
            available_balance: account.available_balance,
        })
    }

    async fn get_position(&self, symbol: &str) -> Result<Option<PositionSnapshot>, ExchangeError> {
        let positions = self.client.get_position_risk(symbol).await?;
        // 수량 0은 무포지션으로 취급
        Ok(positions
            .into_iter()
            .find(|p| p.symbol == symbol && !p.position_amt.is_zero())
            .map(|p| PositionSnapshot {
                symbol: p.symbol,
                signed_quantity: p.position_amt,
                entry_price: p.entry_price,
                unrealized_pnl: p.un_realized_profit,
            }))
    }

    async fn get_mark_price(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        Ok(self.client.get_mark_price(symbol).await?.mark_price)
    }

    async fn place_limit_order(&self, order: &OrderRequest) -> Result<OrderAck, ExchangeError> {
        let price = order.price.ok_or(ExchangeError::Rejected {
            code: -1102,
            message: "지정가 주문에 price가 없습니다".to_string(),
        })?;
        let ack = self
            .client
            .place_limit_order(
                &order.symbol,
                order.side,
                order.quantity,
                price,
                order.time_in_force,
            )
            .await?;
        Ok(OrderAck {
            order_id: ack.order_id,
        })
    }

    async fn place_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderAck, ExchangeError> {
        let ack = self.client.place_market_order(symbol, side, quantity).await?;
        Ok(OrderAck {
            order_id: ack.order_id,
        })
    }

    async fn place_stop_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        stop_price: Decimal,
    ) -> Result<OrderAck, ExchangeError> {
        let ack = self
            .client
            .place_stop_market_order(symbol, side, quantity, stop_price)
            .await?;
        Ok(OrderAck {
            order_id: ack.order_id,
        })
    }

    async fn get_order_status(
        &self,
        symbol: &str,
        order_id: OrderId,
    ) -> Result<OrderUpdate, ExchangeError> {
        let info = self.client.get_order(symbol, order_id).await?;
        to_order_update(info)
    }

    async fn cancel_order(&self, symbol: &str, order_id: OrderId) -> Result<(), ExchangeError> {
        self.client.cancel_order(symbol, order_id).await?;
        Ok(())
    }

    async fn cancel_all_open_orders(&self, symbol: &str) -> Result<(), ExchangeError> {
        self.client.cancel_all_orders(symbol).await
    }

    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<(), ExchangeError> {
        let info = self.client.change_leverage(symbol, leverage).await?;
        info!(symbol = %symbol, leverage = info.leverage, "레버리지 설정 완료");
        Ok(())
    }

    async fn set_margin_type(&self, symbol: &str, mode: MarginMode) -> Result<(), ExchangeError> {
        // 헤지 모드 계정은 마진 모드 변경이 불필요
        let position_mode = self.client.get_position_mode().await?;
        if position_mode.dual_side_position {
            info!(symbol = %symbol, "헤지 모드 계정, 마진 모드 변경 생략");
            return Ok(());
        }

        match self.client.change_margin_type(symbol, mode.as_str()).await {
            Ok(()) => Ok(()),
            // No need to change margin type
            Err(ExchangeError::Rejected { code: -4046, .. }) => {
                info!(symbol = %symbol, mode = mode.as_str(), "마진 모드 이미 설정됨");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn exchange_name(&self) -> &str {
        "BinanceFutures"
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use rust_decimal_macros::dec;

    use super::*;

    fn test_provider(base_url: &str) -> BinanceFuturesProvider {
        BinanceFuturesProvider::from_config(
            BinanceFuturesConfig::new("test-key", "test-secret").with_base_url(base_url),
        )
    }

    #[test]
    fn order_state_parsing() {
        assert_eq!(parse_order_state("NEW").unwrap(), OrderState::New);
        assert_eq!(
            parse_order_state("PARTIALLY_FILLED").unwrap(),
            OrderState::PartiallyFilled
        );
        assert_eq!(parse_order_state("FILLED").unwrap(), OrderState::Filled);
        assert_eq!(parse_order_state("CANCELED").unwrap(), OrderState::Canceled);
        assert_eq!(parse_order_state("EXPIRED").unwrap(), OrderState::Canceled);
        assert!(parse_order_state("REJECTED_???").is_err());
    }

    #[tokio::test]
    async fn assembles_rules_from_filters_and_brackets() {
        let mut server = mockito::Server::new_async().await;
        let _info = server
            .mock("GET", "/fapi/v1/exchangeInfo")
            .match_query(Matcher::Any)
            .with_body(
                r#"{"symbols":[{"symbol":"BTCUSDT","filters":[
                    {"filterType":"PRICE_FILTER","tickSize":"0.10"},
                    {"filterType":"LOT_SIZE","stepSize":"0.001","minQty":"0.001"},
                    {"filterType":"MIN_NOTIONAL","notional":"100"}
                ]}]}"#,
            )
            .create_async()
            .await;
        let _brackets = server
            .mock("GET", "/fapi/v1/leverageBracket")
            .match_query(Matcher::Any)
            .with_body(
                r#"[{"symbol":"BTCUSDT","brackets":[
                    {"bracket":1,"initialLeverage":125},
                    {"bracket":2,"initialLeverage":100}
                ]}]"#,
            )
            .create_async()
            .await;

        let provider = test_provider(&server.url());
        let rules = provider.get_symbol_rules("BTCUSDT").await.unwrap();
        assert_eq!(rules.step_size, dec!(0.001));
        assert_eq!(rules.tick_size, dec!(0.10));
        assert_eq!(rules.min_notional, dec!(100));
        assert_eq!(rules.max_leverage, 125);
    }

    #[tokio::test]
    async fn unknown_symbol_is_rules_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _info = server
            .mock("GET", "/fapi/v1/exchangeInfo")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"code":-1121,"msg":"Invalid symbol."}"#)
            .create_async()
            .await;

        let provider = test_provider(&server.url());
        let result = provider.get_symbol_rules("NOPEUSDT").await;
        assert!(matches!(result, Err(ExchangeError::RulesUnavailable(_))));
    }

    #[tokio::test]
    async fn margin_type_already_set_is_tolerated() {
        let mut server = mockito::Server::new_async().await;
        let _mode = server
            .mock("GET", "/fapi/v1/positionSide/dual")
            .match_query(Matcher::Any)
            .with_body(r#"{"dualSidePosition":false}"#)
            .create_async()
            .await;
        let _margin = server
            .mock("POST", "/fapi/v1/marginType")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"code":-4046,"msg":"No need to change margin type."}"#)
            .create_async()
            .await;

        let provider = test_provider(&server.url());
        assert!(provider
            .set_margin_type("BTCUSDT", MarginMode::Isolated)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn hedge_mode_skips_margin_type_change() {
        let mut server = mockito::Server::new_async().await;
        let _mode = server
            .mock("GET", "/fapi/v1/positionSide/dual")
            .match_query(Matcher::Any)
            .with_body(r#"{"dualSidePosition":true}"#)
            .create_async()
            .await;
        // marginType 엔드포인트에는 mock이 없다: 호출되면 테스트 실패

        let provider = test_provider(&server.url());
        assert!(provider
            .set_margin_type("BTCUSDT", MarginMode::Isolated)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn flat_position_maps_to_none() {
        let mut server = mockito::Server::new_async().await;
        let _positions = server
            .mock("GET", "/fapi/v2/positionRisk")
            .match_query(Matcher::Any)
            .with_body(
                r#"[{"symbol":"BTCUSDT","positionAmt":"0","entryPrice":"0","unRealizedProfit":"0"}]"#,
            )
            .create_async()
            .await;

        let provider = test_provider(&server.url());
        let position = provider.get_position("BTCUSDT").await.unwrap();
        assert!(position.is_none());
    }
}
