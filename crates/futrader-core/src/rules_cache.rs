//! 심볼 거래 규칙 캐시.
//!
//! 거래 규칙(tick/step/minQty/minNotional/maxLeverage)은 프로세스 수명 동안
//! 안정적이라고 가정하고 최초 접근 시 한 번만 조회합니다. TTL은 없습니다.
//!
//! # 사용 패턴
//!
//! ```text
//! // 엔진 인스턴스가 캐시를 소유 (전역 상태 없음)
//! let rules = self.rules.get_or_fetch("BTCUSDT", &*self.exchange).await?;
//!
//! // 규칙 변경이 의심되면 명시적으로 무효화
//! self.rules.invalidate("BTCUSDT").await;
//! ```

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{FuturesExchange, SymbolTradingRules};
use crate::error::ExchangeError;

/// 심볼별 거래 규칙 캐시.
///
/// 최초 채움 이후 읽기 전용이므로 동시 쓰기 위험이 없습니다.
/// 조회 실패는 `RulesUnavailable`로 현재 사이클을 중단시킵니다.
/// 규칙은 안정적이라는 가정 하에, 일시적 조회 실패에 대해 재시도하거나
/// 추측한 제약으로 동작하는 대신 중단을 택합니다.
#[derive(Debug, Default)]
pub struct RulesCache {
    rules: RwLock<HashMap<String, SymbolTradingRules>>,
}

impl RulesCache {
    /// 빈 캐시 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 캐시된 규칙 조회, 없으면 거래소에서 조회 후 저장.
    ///
    /// # Errors
    ///
    /// 심볼이 알 수 없거나 조회가 실패하면 `ExchangeError::RulesUnavailable`.
    /// 실패한 조회 결과는 캐시되지 않습니다.
    pub async fn get_or_fetch(
        &self,
        symbol: &str,
        exchange: &dyn FuturesExchange,
    ) -> Result<SymbolTradingRules, ExchangeError> {
        if let Some(cached) = self.rules.read().await.get(symbol) {
            return Ok(cached.clone());
        }

        let fetched = exchange.get_symbol_rules(symbol).await.map_err(|e| match e {
            ExchangeError::RulesUnavailable(msg) => ExchangeError::RulesUnavailable(msg),
            other => ExchangeError::RulesUnavailable(other.to_string()),
        })?;

        debug!(
            symbol = %symbol,
            step_size = %fetched.step_size,
            tick_size = %fetched.tick_size,
            min_notional = %fetched.min_notional,
            max_leverage = fetched.max_leverage,
            "심볼 규칙 캐시 저장"
        );

        let mut guard = self.rules.write().await;
        guard.insert(symbol.to_string(), fetched.clone());
        Ok(fetched)
    }

    /// 특정 심볼의 캐시 무효화.
    ///
    /// 다음 `get_or_fetch` 호출 시 거래소에서 다시 조회합니다.
    pub async fn invalidate(&self, symbol: &str) {
        self.rules.write().await.remove(symbol);
    }

    /// 캐시 보유 여부 (테스트/진단용).
    pub async fn contains(&self, symbol: &str) -> bool {
        self.rules.read().await.contains_key(symbol)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::{
        AccountSnapshot, MarginMode, OrderAck, OrderId, OrderRequest, OrderUpdate,
        PositionSnapshot, Side,
    };

    /// 규칙 조회 횟수를 세는 mock 거래소.
    struct CountingExchange {
        fetch_count: AtomicU32,
        should_fail: bool,
    }

    impl CountingExchange {
        fn new(should_fail: bool) -> Self {
            Self {
                fetch_count: AtomicU32::new(0),
                should_fail,
            }
        }
    }

    #[async_trait]
    impl FuturesExchange for CountingExchange {
        async fn get_symbol_rules(
            &self,
            symbol: &str,
        ) -> Result<SymbolTradingRules, ExchangeError> {
            self.fetch_count.fetch_add(1, Ordering::SeqCst);
            if self.should_fail {
                return Err(ExchangeError::Network("연결 실패".to_string()));
            }
            Ok(SymbolTradingRules {
                symbol: symbol.to_string(),
                step_size: dec!(0.001),
                min_qty: dec!(0.001),
                tick_size: dec!(0.1),
                min_notional: dec!(100),
                max_leverage: 125,
            })
        }

        async fn get_account_balance(&self) -> Result<AccountSnapshot, ExchangeError> {
            unimplemented!()
        }

        async fn get_position(
            &self,
            _symbol: &str,
        ) -> Result<Option<PositionSnapshot>, ExchangeError> {
            unimplemented!()
        }

        async fn get_mark_price(&self, _symbol: &str) -> Result<Decimal, ExchangeError> {
            unimplemented!()
        }

        async fn place_limit_order(
            &self,
            _order: &OrderRequest,
        ) -> Result<OrderAck, ExchangeError> {
            unimplemented!()
        }

        async fn place_market_order(
            &self,
            _symbol: &str,
            _side: Side,
            _quantity: Decimal,
        ) -> Result<OrderAck, ExchangeError> {
            unimplemented!()
        }

        async fn place_stop_market_order(
            &self,
            _symbol: &str,
            _side: Side,
            _quantity: Decimal,
            _stop_price: Decimal,
        ) -> Result<OrderAck, ExchangeError> {
            unimplemented!()
        }

        async fn get_order_status(
            &self,
            _symbol: &str,
            _order_id: OrderId,
        ) -> Result<OrderUpdate, ExchangeError> {
            unimplemented!()
        }

        async fn cancel_order(
            &self,
            _symbol: &str,
            _order_id: OrderId,
        ) -> Result<(), ExchangeError> {
            unimplemented!()
        }

        async fn cancel_all_open_orders(&self, _symbol: &str) -> Result<(), ExchangeError> {
            unimplemented!()
        }

        async fn set_leverage(&self, _symbol: &str, _leverage: u32) -> Result<(), ExchangeError> {
            unimplemented!()
        }

        async fn set_margin_type(
            &self,
            _symbol: &str,
            _mode: MarginMode,
        ) -> Result<(), ExchangeError> {
            unimplemented!()
        }

        fn exchange_name(&self) -> &str {
            "CountingExchange"
        }
    }

    #[tokio::test]
    async fn fetches_once_then_serves_from_cache() {
        let cache = RulesCache::new();
        let exchange = CountingExchange::new(false);

        let first = cache.get_or_fetch("BTCUSDT", &exchange).await.unwrap();
        let second = cache.get_or_fetch("BTCUSDT", &exchange).await.unwrap();

        assert_eq!(first.step_size, second.step_size);
        assert_eq!(exchange.fetch_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cache = RulesCache::new();
        let exchange = CountingExchange::new(false);

        cache.get_or_fetch("BTCUSDT", &exchange).await.unwrap();
        cache.invalidate("BTCUSDT").await;
        assert!(!cache.contains("BTCUSDT").await);

        cache.get_or_fetch("BTCUSDT", &exchange).await.unwrap();
        assert_eq!(exchange.fetch_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetch_failure_maps_to_rules_unavailable_and_is_not_cached() {
        let cache = RulesCache::new();
        let exchange = CountingExchange::new(true);

        let result = cache.get_or_fetch("BTCUSDT", &exchange).await;
        assert!(matches!(
            result,
            Err(ExchangeError::RulesUnavailable(_))
        ));
        assert!(!cache.contains("BTCUSDT").await);

        // 실패가 캐시되지 않았으므로 다음 호출은 다시 조회한다
        let _ = cache.get_or_fetch("BTCUSDT", &exchange).await;
        assert_eq!(exchange.fetch_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn symbols_are_cached_independently() {
        let cache = RulesCache::new();
        let exchange = CountingExchange::new(false);

        cache.get_or_fetch("BTCUSDT", &exchange).await.unwrap();
        cache.get_or_fetch("ETHUSDT", &exchange).await.unwrap();
        assert_eq!(exchange.fetch_count.load(Ordering::SeqCst), 2);
        assert!(cache.contains("BTCUSDT").await);
        assert!(cache.contains("ETHUSDT").await);
    }
}
