//! Binance 선물 API 응답 타입.
//!
//! Binance는 수치를 JSON 문자열로 내려주므로 모든 수치 필드는
//! `Decimal`로 직접 역직렬화합니다. 이 모듈의 serde 타입은 crate 내부에
//! 머물고, provider 계층에서 거래소 중립 도메인 타입으로 변환됩니다.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Binance 에러 응답 본문 (`{"code": -2019, "msg": "..."}`).
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub msg: String,
}

// ==================== exchangeInfo ====================

/// `/fapi/v1/exchangeInfo` 응답.
#[derive(Debug, Deserialize)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}

/// 심볼 메타데이터.
#[derive(Debug, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub filters: Vec<SymbolFilter>,
}

/// 심볼 필터.
///
/// 이 엔진이 소비하는 세 종류만 구분하고 나머지는 `Other`로 흘려보냅니다.
#[derive(Debug, Deserialize)]
#[serde(tag = "filterType")]
pub enum SymbolFilter {
    #[serde(rename = "PRICE_FILTER", rename_all = "camelCase")]
    PriceFilter { tick_size: Decimal },
    #[serde(rename = "LOT_SIZE", rename_all = "camelCase")]
    LotSize {
        step_size: Decimal,
        min_qty: Decimal,
    },
    #[serde(rename = "MIN_NOTIONAL", rename_all = "camelCase")]
    MinNotional { notional: Decimal },
    #[serde(other)]
    Other,
}

// ==================== leverageBracket ====================

/// `/fapi/v1/leverageBracket` 응답 항목.
#[derive(Debug, Deserialize)]
pub struct LeverageBracketEntry {
    pub symbol: String,
    pub brackets: Vec<LeverageBracket>,
}

/// 레버리지 구간.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverageBracket {
    pub initial_leverage: u32,
}

// ==================== 계좌 / 포지션 ====================

/// `/fapi/v2/account` 응답 (사용 필드만).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub available_balance: Decimal,
}

/// `/fapi/v2/positionRisk` 응답 항목.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRisk {
    pub symbol: String,
    pub position_amt: Decimal,
    pub entry_price: Decimal,
    pub un_realized_profit: Decimal,
}

/// `/fapi/v1/positionSide/dual` 응답.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionModeInfo {
    pub dual_side_position: bool,
}

// ==================== 시세 ====================

/// `/fapi/v1/premiumIndex` 응답 (사용 필드만).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPriceInfo {
    pub symbol: String,
    pub mark_price: Decimal,
}

// ==================== 주문 ====================

/// 주문 제출 응답 (사용 필드만).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderAck {
    pub order_id: u64,
}

/// 주문 조회/취소 응답 (사용 필드만).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusInfo {
    pub order_id: u64,
    pub status: String,
    pub executed_qty: Decimal,
    pub avg_price: Decimal,
}

/// `/fapi/v1/allOpenOrders` 및 `/fapi/v1/marginType` 응답.
#[derive(Debug, Deserialize)]
pub struct CodeMsgResponse {
    pub code: i64,
    pub msg: String,
}

/// `/fapi/v1/leverage` 응답.
#[derive(Debug, Deserialize)]
pub struct LeverageInfo {
    pub symbol: String,
    pub leverage: u32,
}
