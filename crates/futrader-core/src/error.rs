//! 거래소 에러 분류.
//!
//! 모든 거래소 호출은 이 타입으로 실패를 보고합니다.
//! 재시도 컨트롤러와 주문 생명주기 루프는 catch-all 대신
//! 분류 헬퍼(`is_margin_shortfall`, `is_transient`)로 분기합니다.

use thiserror::Error;

/// 거래소 호출 에러.
#[derive(Debug, Clone, Error)]
pub enum ExchangeError {
    /// 네트워크 연결 실패 / 요청 타임아웃
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 인증 실패 (API 키 오류 등)
    #[error("인증 실패: {0}")]
    Authentication(String),

    /// 심볼 거래 규칙 조회 불가 (알 수 없는 심볼 포함)
    ///
    /// 현재 사이클에 치명적입니다. 규칙 없이 주문을 만들 수 없으므로
    /// 재시도하지 않고 사이클을 중단합니다.
    #[error("심볼 규칙 조회 불가: {0}")]
    RulesUnavailable(String),

    /// 증거금 부족 (Binance code -2019)
    ///
    /// 복구 가능: 재시도 컨트롤러가 수량을 줄여 재시도합니다.
    #[error("증거금 부족: {0}")]
    InsufficientMargin(String),

    /// 거래소가 주문/요청을 거부 (기타 브로커 에러)
    #[error("거래소 거부 (code {code}): {message}")]
    Rejected { code: i64, message: String },

    /// 응답 파싱 실패
    #[error("응답 파싱 실패: {0}")]
    Parse(String),

    /// 요청 한도 초과
    #[error("요청 한도 초과")]
    RateLimited,
}

impl ExchangeError {
    /// 증거금 부족 여부.
    ///
    /// 재시도 컨트롤러가 수량 축소 재시도의 대상으로 삼는 유일한 분류입니다.
    pub fn is_margin_shortfall(&self) -> bool {
        matches!(self, Self::InsufficientMargin(_))
    }

    /// 일시적 에러 여부.
    ///
    /// 상태 폴링 루프는 이 분류의 에러를 삼키고 마감 시한까지 계속 폴링합니다.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimited)
    }
}
