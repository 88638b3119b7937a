//! 증거금 부족 재시도 컨트롤러.
//!
//! 사이징 + 생명주기 실행을 한 단위로 감싸고, 거래소가
//! `InsufficientMargin`으로 거부하면 수량을 10% 줄여 재시도합니다.
//! 다른 모든 에러는 재시도 없이 즉시 반환됩니다.

use std::future::Future;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, warn};

use futrader_core::SymbolTradingRules;

use crate::error::ExecutionError;
use crate::normalize::normalize_quantity;

/// 재시도 정책.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// 총 시도 횟수 상한 (기본 3)
    pub max_attempts: u32,
    /// 시도 간 대기 (기본 5초)
    pub pause: Duration,
    /// 시도마다 곱하는 수량 축소 계수 (기본 0.9)
    pub reduction_factor: Decimal,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            pause: Duration::from_secs(5),
            reduction_factor: Decimal::new(9, 1), // 0.9
        }
    }
}

/// 증거금 부족에 한해 수량을 줄여가며 재시도.
///
/// `attempt_fn`은 시도마다 현재 수량으로 호출됩니다. 축소된 수량은
/// 다시 step 단위로 정규화되어 거래소 규격을 유지합니다.
///
/// # Errors
///
/// - `ExecutionError::MarginRetriesExhausted`: 한도 내 모든 시도가
///   증거금 부족으로 실패
/// - 그 외 에러는 첫 발생 시 그대로 반환
pub async fn with_margin_retry<T, F, Fut>(
    policy: &RetryPolicy,
    rules: &SymbolTradingRules,
    initial_quantity: Decimal,
    mut attempt_fn: F,
) -> Result<T, ExecutionError>
where
    F: FnMut(Decimal) -> Fut,
    Fut: Future<Output = Result<T, ExecutionError>>,
{
    let mut quantity = initial_quantity;
    let mut attempt = 1u32;

    loop {
        match attempt_fn(quantity).await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempt, %quantity, "수량 축소 재시도 후 성공");
                }
                return Ok(value);
            }
            Err(e) if e.is_margin_shortfall() => {
                if attempt >= policy.max_attempts {
                    warn!(
                        attempts = attempt,
                        max_attempts = policy.max_attempts,
                        "증거금 부족 재시도 한도 소진"
                    );
                    return Err(ExecutionError::MarginRetriesExhausted);
                }

                let reduced = normalize_quantity(quantity * policy.reduction_factor, rules);
                warn!(
                    error = %e,
                    attempt,
                    quantity = %quantity,
                    reduced = %reduced,
                    pause_secs = policy.pause.as_secs(),
                    "증거금 부족, 수량 축소 후 재시도"
                );
                quantity = reduced;
                sleep(policy.pause).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
