//! 실행 엔진 파사드.
//!
//! 한 번의 `execute_position_action` 호출로 정리 → 스냅샷 → 사이징 →
//! 생명주기 → 스톱 부착의 전체 흐름을 조율합니다.
//! 호출은 심볼 단위로 순차 실행을 전제하며
//! (동시 호출 직렬화는 호출측 책임), 잔고/포지션은 매 사이클 새로
//! 조회합니다.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use futrader_core::{
    ExecutionReport, ExecutionStatus, FuturesExchange, MarginMode, RulesCache, Side,
    SymbolTradingRules, TradeAction, TradingInstruction,
};

use crate::error::ExecutionError;
use crate::lifecycle::{LifecycleConfig, LifecycleOutcome, OrderLifecycle};
use crate::retry::{with_margin_retry, RetryPolicy};
use crate::sizer;
use crate::stop_loss::{attach_stop_loss, StopLossConfig};

/// 엔진 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 대상 심볼 (호출 1회당 단일 심볼)
    pub symbol: String,
    /// 마진 모드 (기본 격리)
    pub margin_mode: MarginMode,
    /// 지정가 생명주기 사용 여부. false면 즉시 시장가로 체결합니다.
    pub use_limit: bool,
    /// 생명주기 설정
    pub lifecycle: LifecycleConfig,
    /// 증거금 재시도 정책
    pub retry: RetryPolicy,
    /// 보호 스톱 설정
    pub stop_loss: StopLossConfig,
}

impl EngineConfig {
    /// 기본값으로 설정 생성.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            margin_mode: MarginMode::Isolated,
            use_limit: true,
            lifecycle: LifecycleConfig::default(),
            retry: RetryPolicy::default(),
            stop_loss: StopLossConfig::default(),
        }
    }
}

/// 주문 실행 엔진.
///
/// # 사용 예시
///
/// ```ignore
/// let provider = Arc::new(BinanceFuturesProvider::from_config(config));
/// let engine = ExecutionEngine::new(provider, EngineConfig::new("BTCUSDT"));
///
/// let report = engine.execute_position_action(&instruction).await;
/// ```
pub struct ExecutionEngine {
    exchange: Arc<dyn FuturesExchange>,
    rules_cache: RulesCache,
    config: EngineConfig,
}

impl ExecutionEngine {
    /// 새 엔진 생성. 규칙 캐시는 엔진 인스턴스가 소유합니다.
    pub fn new(exchange: Arc<dyn FuturesExchange>, config: EngineConfig) -> Self {
        Self {
            exchange,
            rules_cache: RulesCache::new(),
            config,
        }
    }

    /// 설정 조회.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 규칙 캐시 접근 (무효화용).
    pub fn rules_cache(&self) -> &RulesCache {
        &self.rules_cache
    }

    /// 거래 지시 1건 실행.
    ///
    /// 에러를 밖으로 전파하지 않습니다. 모든 실패 경로는
    /// `ExecutionReport { status: Failed, reason }`로 종결됩니다.
    pub async fn execute_position_action(&self, instruction: &TradingInstruction) -> ExecutionReport {
        // Hold는 어떤 거래소 호출도 없이 단락
        if instruction.action == TradeAction::Hold {
            info!(reason = %instruction.reason, "Hold 지시, 주문 없음");
            return ExecutionReport::hold();
        }

        match self.run(instruction).await {
            Ok(report) => report,
            Err(e) => {
                warn!(
                    exchange = self.exchange.exchange_name(),
                    action = ?instruction.action,
                    error = %e,
                    "포지션 액션 실패"
                );
                ExecutionReport::failed(e.to_string())
            }
        }
    }

    async fn run(
        &self,
        instruction: &TradingInstruction,
    ) -> Result<ExecutionReport, ExecutionError> {
        let symbol = self.config.symbol.clone();
        let rules = self
            .rules_cache
            .get_or_fetch(&symbol, self.exchange.as_ref())
            .await?;

        // 1. 잔존 지정가/스톱 주문 정리 (주문 충돌, 이중 보호 방지)
        self.exchange.cancel_all_open_orders(&symbol).await?;

        // 2. 스냅샷 갱신 (사이클 간 캐시 금지)
        let account = self.exchange.get_account_balance().await?;
        let position = self.exchange.get_position(&symbol).await?;
        let mark_price = self.exchange.get_mark_price(&symbol).await?;
        info!(
            exchange = self.exchange.exchange_name(),
            symbol = %symbol,
            action = ?instruction.action,
            percentage = %instruction.percentage,
            balance = %account.available_balance,
            mark_price = %mark_price,
            reason = %instruction.reason,
            "실행 사이클 시작"
        );

        let Some(side) = instruction.action.order_side() else {
            return Ok(ExecutionReport::hold());
        };

        if instruction.action.is_open() {
            // 3a. 레버리지/마진 모드 설정 (레버리지 초과는 제약으로 하향)
            let requested = instruction.leverage.ok_or(ExecutionError::MissingLeverage)?;
            let leverage = requested.min(rules.max_leverage);
            if leverage < requested {
                warn!(
                    requested,
                    clamped = leverage,
                    max_leverage = rules.max_leverage,
                    "거래소 최대 레버리지로 하향"
                );
            }
            self.exchange
                .set_margin_type(&symbol, self.config.margin_mode)
                .await?;
            self.exchange.set_leverage(&symbol, leverage).await?;

            // 4a. 사이징 + 생명주기 (증거금 재시도로 감쌈)
            let quantity = sizer::open_quantity(
                &account,
                instruction.percentage,
                leverage,
                mark_price,
                &rules,
            )?;
            let outcome = with_margin_retry(&self.config.retry, &rules, quantity, |qty| {
                self.submit(&symbol, side, qty, mark_price, &rules)
            })
            .await?;

            // 5. 보호 스톱 부착 (실패는 경고로 강등)
            let entry_price = if outcome.avg_price > Decimal::ZERO {
                outcome.avg_price
            } else {
                mark_price
            };
            let report =
                ExecutionReport::filled(outcome.status, outcome.filled_quantity, outcome.avg_price);
            match attach_stop_loss(
                self.exchange.as_ref(),
                &self.config.stop_loss,
                &symbol,
                side,
                outcome.filled_quantity,
                entry_price,
                &rules,
            )
            .await
            {
                Ok(stop_price) => {
                    info!(stop_price = %stop_price, "진입 완료, 스톱 부착됨");
                    Ok(report)
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        "스톱 주문 부착 실패, 포지션은 보호 없이 유지"
                    );
                    Ok(report.with_stop_loss_warning(e.to_string()))
                }
            }
        } else {
            // 3b. 청산 사이징 + 생명주기
            let quantity = sizer::close_quantity(
                &symbol,
                position.as_ref(),
                instruction.action,
                instruction.percentage,
                &rules,
            )?;
            let outcome = with_margin_retry(&self.config.retry, &rules, quantity, |qty| {
                self.submit(&symbol, side, qty, mark_price, &rules)
            })
            .await?;
            Ok(ExecutionReport::filled(
                outcome.status,
                outcome.filled_quantity,
                outcome.avg_price,
            ))
        }
    }

    /// 주문 1건 제출 (설정에 따라 지정가 생명주기 또는 즉시 시장가).
    async fn submit(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        mark_price: Decimal,
        rules: &SymbolTradingRules,
    ) -> Result<LifecycleOutcome, ExecutionError> {
        if self.config.use_limit {
            return OrderLifecycle::new(self.exchange.as_ref(), &self.config.lifecycle)
                .run(symbol, side, quantity, mark_price, rules)
                .await;
        }

        let ack = self
            .exchange
            .place_market_order(symbol, side, quantity)
            .await?;
        let (filled_quantity, avg_price) =
            match self.exchange.get_order_status(symbol, ack.order_id).await {
                Ok(update) if update.has_fill() => (update.executed_qty, update.avg_price),
                Ok(_) | Err(_) => (quantity, mark_price),
            };
        Ok(LifecycleOutcome {
            status: ExecutionStatus::Success,
            filled_quantity,
            avg_price,
        })
    }
}
