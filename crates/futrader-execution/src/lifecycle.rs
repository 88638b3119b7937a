//! 주문 생명주기 관리.
//!
//! 지정가 제출 → 폴링 → 시장가 전환의 상태 기계로 단일 주문을 완주시킵니다.
//!
//! # 알고리즘
//!
//! ```text
//! 1. 마크 가격 ±0.1% 오프셋의 지정가(GTC) 제출
//!    (매수는 마크 위로, 매도는 마크 아래로: 즉시 체결에 유리한 쪽)
//! 2. wait_time 동안 poll_interval 간격으로 상태 조회
//!    - Filled            → Success 종결
//!    - 일시적 조회 실패  → 삼키고 계속 (마감 시한까지)
//! 3. 마감 시한 도달
//!    - 부분 체결         → 취소 + 잔량 시장가 → PartialThenMarket
//!    - 전량 미체결       → 취소 + 전량 시장가 → TimeoutThenMarket
//! ```
//!
//! 시한 내에는 호가에 얹힌 유동성의 가격 개선을 취하고, 시한이 지나면
//! 가격을 양보하는 대신 포지션 변경의 완결을 보장합니다.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use futrader_core::{
    ExchangeError, ExecutionStatus, FuturesExchange, OrderRequest, OrderState, OrderUpdate, Side,
    SymbolTradingRules, TimeInForce,
};

use crate::error::ExecutionError;
use crate::normalize::normalize_price;

/// 생명주기 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// 지정가 대기 시간 (기본 300초)
    pub wait_time: Duration,
    /// 상태 폴링 간격 (기본 10초)
    pub poll_interval: Duration,
    /// 마크 가격 대비 지정가 오프셋 (%, 기본 0.1)
    pub price_offset_pct: Decimal,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            wait_time: Duration::from_secs(300),
            poll_interval: Duration::from_secs(10),
            price_offset_pct: Decimal::new(1, 1), // 0.1%
        }
    }
}

/// 생명주기 종결 결과.
#[derive(Debug, Clone)]
pub struct LifecycleOutcome {
    /// 종결 상태 (Success / PartialThenMarket / TimeoutThenMarket)
    pub status: ExecutionStatus,
    /// 총 체결 수량 (지정가 + 시장가)
    pub filled_quantity: Decimal,
    /// 체결 평균가 (지정가/시장가 가중 평균)
    pub avg_price: Decimal,
}

/// 단일 주문을 감독하는 생명주기 관리자.
pub struct OrderLifecycle<'a> {
    exchange: &'a dyn FuturesExchange,
    config: &'a LifecycleConfig,
}

impl<'a> OrderLifecycle<'a> {
    pub fn new(exchange: &'a dyn FuturesExchange, config: &'a LifecycleConfig) -> Self {
        Self { exchange, config }
    }

    /// 지정가 가격 산출.
    ///
    /// 매수는 마크 위 0.1%, 매도는 마크 아래 0.1%로 즉시 체결을 유도합니다.
    fn limit_price(&self, side: Side, mark_price: Decimal, rules: &SymbolTradingRules) -> Decimal {
        let offset = mark_price * self.config.price_offset_pct / Decimal::ONE_HUNDRED;
        let raw = match side {
            Side::Buy => mark_price + offset,
            Side::Sell => mark_price - offset,
        };
        normalize_price(raw, rules)
    }

    /// 주문 1건을 종결까지 실행.
    ///
    /// `quantity`와 가격은 이 안에서 정규화된 지정가로 제출되고,
    /// 시한 초과 시 시장가로 전환됩니다. 어떤 경로든
    /// `LifecycleOutcome`으로 종결되거나 거래소 에러를 반환합니다.
    pub async fn run(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        mark_price: Decimal,
        rules: &SymbolTradingRules,
    ) -> Result<LifecycleOutcome, ExecutionError> {
        let price = self.limit_price(side, mark_price, rules);
        let order = OrderRequest {
            symbol: symbol.to_string(),
            side,
            quantity,
            price: Some(price),
            time_in_force: TimeInForce::Gtc,
        };
        let ack = self.exchange.place_limit_order(&order).await?;
        info!(
            symbol,
            %side,
            %quantity,
            %price,
            order_id = ack.order_id,
            "지정가 주문 제출, 체결 감시 시작"
        );

        let started = Instant::now();
        let mut last_update: Option<OrderUpdate> = None;
        let mut externally_canceled = false;

        loop {
            match self.exchange.get_order_status(symbol, ack.order_id).await {
                Ok(update) => match update.state {
                    OrderState::Filled => {
                        info!(
                            order_id = ack.order_id,
                            filled = %update.executed_qty,
                            avg_price = %update.avg_price,
                            "지정가 전량 체결"
                        );
                        return Ok(LifecycleOutcome {
                            status: ExecutionStatus::Success,
                            filled_quantity: update.executed_qty,
                            avg_price: update.avg_price,
                        });
                    }
                    OrderState::Canceled => {
                        warn!(
                            order_id = ack.order_id,
                            filled = %update.executed_qty,
                            "주문이 외부에서 취소됨, 잔량 시장가 전환"
                        );
                        externally_canceled = true;
                        last_update = Some(update);
                        break;
                    }
                    OrderState::New | OrderState::PartiallyFilled => {
                        last_update = Some(update);
                    }
                },
                // 일시적 조회 실패는 삼키고 마감 시한까지 계속
                Err(e) if e.is_transient() => {
                    warn!(error = %e, order_id = ack.order_id, "상태 조회 실패, 폴링 계속");
                }
                Err(e) => return Err(e.into()),
            }

            if started.elapsed() >= self.config.wait_time {
                break;
            }
            sleep(self.config.poll_interval).await;
        }

        // 마감 시한: 잔량을 시장가로 전환
        let filled = last_update
            .as_ref()
            .map(|u| u.executed_qty)
            .unwrap_or(Decimal::ZERO);
        let limit_avg = last_update
            .as_ref()
            .map(|u| u.avg_price)
            .unwrap_or(Decimal::ZERO);

        if !externally_canceled {
            if let Err(e) = self.exchange.cancel_order(symbol, ack.order_id).await {
                // 취소 실패는 마감 직전 전량 체결과의 경합일 수 있다
                match self.exchange.get_order_status(symbol, ack.order_id).await {
                    Ok(update) if update.state == OrderState::Filled => {
                        info!(order_id = ack.order_id, "취소 직전 전량 체결 확인");
                        return Ok(LifecycleOutcome {
                            status: ExecutionStatus::Success,
                            filled_quantity: update.executed_qty,
                            avg_price: update.avg_price,
                        });
                    }
                    _ => return Err(e.into()),
                }
            }
        }

        let remaining = quantity - filled;
        if remaining <= Decimal::ZERO {
            return Ok(LifecycleOutcome {
                status: ExecutionStatus::Success,
                filled_quantity: filled,
                avg_price: limit_avg,
            });
        }

        let market_ack = self
            .exchange
            .place_market_order(symbol, side, remaining)
            .await?;
        let (market_qty, market_avg) = match self
            .exchange
            .get_order_status(symbol, market_ack.order_id)
            .await
        {
            Ok(update) if update.has_fill() => (update.executed_qty, update.avg_price),
            Ok(_) | Err(_) => {
                warn!(
                    order_id = market_ack.order_id,
                    "시장가 체결 조회 실패, 마크 가격으로 추정"
                );
                (remaining, mark_price)
            }
        };

        let total = filled + market_qty;
        let avg_price = if total > Decimal::ZERO {
            (filled * limit_avg + market_qty * market_avg) / total
        } else {
            mark_price
        };
        let status = if filled > Decimal::ZERO {
            ExecutionStatus::PartialThenMarket
        } else {
            ExecutionStatus::TimeoutThenMarket
        };
        warn!(
            symbol,
            ?status,
            limit_filled = %filled,
            market_filled = %market_qty,
            avg_price = %avg_price,
            "시한 초과, 시장가 전환으로 종결"
        );

        Ok(LifecycleOutcome {
            status,
            filled_quantity: total,
            avg_price,
        })
    }
}
