//! 실행 엔진 에러.

use rust_decimal::Decimal;
use thiserror::Error;

use futrader_core::ExchangeError;

/// 실행 단계 에러.
///
/// 엔진 경계 밖으로는 나가지 않습니다. 파사드가 모든 변형을
/// `ExecutionReport::failed`로 변환합니다.
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    /// 청산 지시인데 해당 방향의 포지션이 없음
    #[error("청산할 포지션 없음: {symbol}")]
    NoPositionToClose { symbol: String },

    /// 비중이 1~100 범위 밖
    #[error("유효하지 않은 비중: {percentage} (1~100 허용)")]
    InvalidPercentage { percentage: Decimal },

    /// 사이징에 쓸 수 없는 가격 (0 이하)
    #[error("유효하지 않은 가격: {price}")]
    InvalidPrice { price: Decimal },

    /// 진입 지시에 레버리지가 지정되지 않음
    #[error("진입 지시에 레버리지 없음")]
    MissingLeverage,

    /// 증거금 부족 재시도 한도 소진
    #[error("max retries: insufficient margin")]
    MarginRetriesExhausted,

    /// 거래소 에러 전달
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

impl ExecutionError {
    /// 증거금 부족으로 인한 실패 여부 (재시도 컨트롤러 분기용).
    pub fn is_margin_shortfall(&self) -> bool {
        matches!(self, Self::Exchange(e) if e.is_margin_shortfall())
    }
}
