//! 실행 결과 보고.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 실행 종결 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// 지정가 전량 체결
    Success,
    /// 부분 체결 후 잔량 시장가 전환
    PartialThenMarket,
    /// 시한 내 미체결, 전량 시장가 전환
    TimeoutThenMarket,
    /// 주문 없음 (Hold 지시)
    Hold,
    /// 실패 (reason 필드에 사유)
    Failed,
}

/// 한 번의 `execute_position_action` 호출 결과.
///
/// 엔진 경계를 넘는 에러는 없습니다. 모든 경로가 이 타입으로 종결되며,
/// 부분 성공(예: 진입 성공 후 스톱 주문 실패)은 `stop_loss_warning`으로
/// 전달됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// 종결 상태
    pub status: ExecutionStatus,
    /// 체결 수량 (base 자산)
    pub filled_quantity: Decimal,
    /// 체결 평균가
    pub avg_price: Decimal,
    /// 스톱 주문 부착 실패 경고.
    ///
    /// 포지션은 열려 있으나 하방 보호가 없는 상태입니다.
    /// 전체 액션의 실패로 취급하지 않습니다.
    pub stop_loss_warning: Option<String>,
    /// 실패 사유 (`Failed`일 때만)
    pub reason: Option<String>,
    /// 종결 시각
    pub executed_at: DateTime<Utc>,
}

impl ExecutionReport {
    /// 체결 결과 보고 생성.
    pub fn filled(status: ExecutionStatus, filled_quantity: Decimal, avg_price: Decimal) -> Self {
        Self {
            status,
            filled_quantity,
            avg_price,
            stop_loss_warning: None,
            reason: None,
            executed_at: Utc::now(),
        }
    }

    /// Hold 보고 생성.
    pub fn hold() -> Self {
        Self {
            status: ExecutionStatus::Hold,
            filled_quantity: Decimal::ZERO,
            avg_price: Decimal::ZERO,
            stop_loss_warning: None,
            reason: None,
            executed_at: Utc::now(),
        }
    }

    /// 실패 보고 생성.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Failed,
            filled_quantity: Decimal::ZERO,
            avg_price: Decimal::ZERO,
            stop_loss_warning: None,
            reason: Some(reason.into()),
            executed_at: Utc::now(),
        }
    }

    /// 스톱 주문 경고 부착.
    pub fn with_stop_loss_warning(mut self, warning: impl Into<String>) -> Self {
        self.stop_loss_warning = Some(warning.into());
        self
    }

    /// 포지션 변경이 완료된 상태인지 여부.
    pub fn is_executed(&self) -> bool {
        matches!(
            self.status,
            ExecutionStatus::Success
                | ExecutionStatus::PartialThenMarket
                | ExecutionStatus::TimeoutThenMarket
        )
    }
}
