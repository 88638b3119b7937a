//! Binance USDT-M 선물 REST 클라이언트.
//!
//! 서명 규칙: 쿼리 문자열 + `timestamp`(+`recvWindow`)를 HMAC-SHA256으로
//! 서명하여 `signature` 파라미터로 덧붙이고, API 키는 `X-MBX-APIKEY`
//! 헤더로 전달합니다. 주문 계열 엔드포인트는 POST/DELETE에서도 쿼리
//! 파라미터를 사용합니다.

use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use tracing::{debug, info};

use futrader_core::{ExchangeError, Side, TimeInForce};

use super::types::{
    AccountInfo, ApiErrorBody, CodeMsgResponse, ExchangeInfo, LeverageBracketEntry, LeverageInfo,
    MarkPriceInfo, NewOrderAck, OrderStatusInfo, PositionModeInfo, PositionRisk,
};
use crate::config::BinanceFuturesConfig;

type HmacSha256 = Hmac<Sha256>;

/// Binance 에러 코드 → `ExchangeError` 매핑.
///
/// 재시도/중단 분기가 이 매핑에 의존하므로 코드 단위로 분류합니다.
fn map_api_error(code: i64, msg: String) -> ExchangeError {
    match code {
        // Margin is insufficient
        -2019 => ExchangeError::InsufficientMargin(msg),
        // Invalid symbol
        -1121 => ExchangeError::RulesUnavailable(msg),
        // Too many requests
        -1003 => ExchangeError::RateLimited,
        // Timestamp outside of recvWindow: 시계 오차, 일시적으로 취급
        -1021 => ExchangeError::Network(msg),
        // API key 형식 오류 / 권한 없음
        -2014 | -2015 => ExchangeError::Authentication(msg),
        _ => ExchangeError::Rejected { code, message: msg },
    }
}

/// 파라미터 목록을 쿼리 문자열로 직렬화.
fn encode_params(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Decimal을 wire 형식으로 (불필요한 후행 0 제거).
fn decimal_param(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Binance USDT-M 선물 REST 클라이언트.
pub struct BinanceFuturesClient {
    http: Client,
    config: BinanceFuturesConfig,
}

impl BinanceFuturesClient {
    /// 새 클라이언트 생성.
    pub fn new(config: BinanceFuturesConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// 쿼리 문자열 서명 (HMAC-SHA256, hex).
    fn sign(&self, query: &str) -> Result<String, ExchangeError> {
        let mut mac = HmacSha256::new_from_slice(self.config.secret_bytes())
            .map_err(|e| ExchangeError::Authentication(format!("HMAC 키 초기화 실패: {e}")))?;
        mac.update(query.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// 응답 본문 파싱. HTTP 에러는 Binance 에러 본문을 해석해 분류합니다.
    async fn parse_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ExchangeError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Network(e.to_string()))?;

        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(ExchangeError::RateLimited);
            }
            if let Ok(api_error) = serde_json::from_str::<ApiErrorBody>(&body) {
                return Err(map_api_error(api_error.code, api_error.msg));
            }
            return Err(ExchangeError::Rejected {
                code: i64::from(status.as_u16()),
                message: body,
            });
        }

        serde_json::from_str::<T>(&body)
            .map_err(|e| ExchangeError::Parse(format!("{e}: {body}")))
    }

    /// 공개 엔드포인트 요청 (서명 없음).
    async fn public_request<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ExchangeError> {
        let mut url = format!("{}{}", self.config.base_url, path);
        if !params.is_empty() {
            url.push('?');
            url.push_str(&encode_params(params));
        }

        debug!(url = %url, "Binance 공개 요청");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ExchangeError::Network(e.to_string()))?;
        self.parse_response(response).await
    }

    /// 서명 엔드포인트 요청.
    async fn signed_request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        mut params: Vec<(&str, String)>,
    ) -> Result<T, ExchangeError> {
        params.push(("recvWindow", self.config.recv_window.to_string()));
        params.push(("timestamp", Utc::now().timestamp_millis().to_string()));

        let query = encode_params(&params);
        let signature = self.sign(&query)?;
        let url = format!(
            "{}{}?{}&signature={}",
            self.config.base_url, path, query, signature
        );

        debug!(method = %method, path = %path, "Binance 서명 요청");
        let response = self
            .http
            .request(method, &url)
            .header("X-MBX-APIKEY", &self.config.api_key)
            .send()
            .await
            .map_err(|e| ExchangeError::Network(e.to_string()))?;
        self.parse_response(response).await
    }

    // ==================== 메타데이터 ====================

    /// 심볼 거래 규칙 원본 조회.
    pub async fn get_exchange_info(&self, symbol: &str) -> Result<ExchangeInfo, ExchangeError> {
        self.public_request("/fapi/v1/exchangeInfo", &[("symbol", symbol.to_string())])
            .await
    }

    /// 레버리지 구간 조회.
    pub async fn get_leverage_brackets(
        &self,
        symbol: &str,
    ) -> Result<Vec<LeverageBracketEntry>, ExchangeError> {
        self.signed_request(
            Method::GET,
            "/fapi/v1/leverageBracket",
            vec![("symbol", symbol.to_string())],
        )
        .await
    }

    /// 마크 가격 조회.
    pub async fn get_mark_price(&self, symbol: &str) -> Result<MarkPriceInfo, ExchangeError> {
        self.public_request("/fapi/v1/premiumIndex", &[("symbol", symbol.to_string())])
            .await
    }

    // ==================== 계좌 / 포지션 ====================

    /// 선물 계좌 조회.
    pub async fn get_account(&self) -> Result<AccountInfo, ExchangeError> {
        self.signed_request(Method::GET, "/fapi/v2/account", vec![])
            .await
    }

    /// 포지션 리스크 조회.
    pub async fn get_position_risk(
        &self,
        symbol: &str,
    ) -> Result<Vec<PositionRisk>, ExchangeError> {
        self.signed_request(
            Method::GET,
            "/fapi/v2/positionRisk",
            vec![("symbol", symbol.to_string())],
        )
        .await
    }

    /// 포지션 모드 조회 (원웨이/헤지).
    pub async fn get_position_mode(&self) -> Result<PositionModeInfo, ExchangeError> {
        self.signed_request(Method::GET, "/fapi/v1/positionSide/dual", vec![])
            .await
    }

    // ==================== 주문 ====================

    /// 지정가 주문 제출.
    pub async fn place_limit_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        time_in_force: TimeInForce,
    ) -> Result<NewOrderAck, ExchangeError> {
        info!(
            symbol = %symbol,
            side = %side,
            quantity = %quantity,
            price = %price,
            "Binance 지정가 주문 제출"
        );
        self.signed_request(
            Method::POST,
            "/fapi/v1/order",
            vec![
                ("symbol", symbol.to_string()),
                ("side", side.to_string()),
                ("type", "LIMIT".to_string()),
                ("timeInForce", time_in_force.to_string()),
                ("quantity", decimal_param(quantity)),
                ("price", decimal_param(price)),
            ],
        )
        .await
    }

    /// 시장가 주문 제출.
    pub async fn place_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<NewOrderAck, ExchangeError> {
        info!(
            symbol = %symbol,
            side = %side,
            quantity = %quantity,
            "Binance 시장가 주문 제출"
        );
        self.signed_request(
            Method::POST,
            "/fapi/v1/order",
            vec![
                ("symbol", symbol.to_string()),
                ("side", side.to_string()),
                ("type", "MARKET".to_string()),
                ("quantity", decimal_param(quantity)),
            ],
        )
        .await
    }

    /// 스톱 시장가 주문 제출.
    ///
    /// `reduceOnly=true`로 제출하여 보호 주문이 포지션을 키우는 일을 막습니다.
    pub async fn place_stop_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        stop_price: Decimal,
    ) -> Result<NewOrderAck, ExchangeError> {
        info!(
            symbol = %symbol,
            side = %side,
            quantity = %quantity,
            stop_price = %stop_price,
            "Binance 스톱 시장가 주문 제출"
        );
        self.signed_request(
            Method::POST,
            "/fapi/v1/order",
            vec![
                ("symbol", symbol.to_string()),
                ("side", side.to_string()),
                ("type", "STOP_MARKET".to_string()),
                ("quantity", decimal_param(quantity)),
                ("stopPrice", decimal_param(stop_price)),
                ("reduceOnly", "true".to_string()),
            ],
        )
        .await
    }

    /// 주문 상태 조회.
    pub async fn get_order(
        &self,
        symbol: &str,
        order_id: u64,
    ) -> Result<OrderStatusInfo, ExchangeError> {
        self.signed_request(
            Method::GET,
            "/fapi/v1/order",
            vec![
                ("symbol", symbol.to_string()),
                ("orderId", order_id.to_string()),
            ],
        )
        .await
    }

    /// 주문 취소.
    pub async fn cancel_order(
        &self,
        symbol: &str,
        order_id: u64,
    ) -> Result<OrderStatusInfo, ExchangeError> {
        info!(symbol = %symbol, order_id, "Binance 주문 취소");
        self.signed_request(
            Method::DELETE,
            "/fapi/v1/order",
            vec![
                ("symbol", symbol.to_string()),
                ("orderId", order_id.to_string()),
            ],
        )
        .await
    }

    /// 심볼의 모든 미체결 주문 취소.
    pub async fn cancel_all_orders(&self, symbol: &str) -> Result<(), ExchangeError> {
        info!(symbol = %symbol, "Binance 미체결 주문 전체 취소");
        let response: CodeMsgResponse = self
            .signed_request(
                Method::DELETE,
                "/fapi/v1/allOpenOrders",
                vec![("symbol", symbol.to_string())],
            )
            .await?;
        if response.code == 200 {
            Ok(())
        } else {
            Err(map_api_error(response.code, response.msg))
        }
    }

    // ==================== 계정 설정 ====================

    /// 레버리지 변경.
    pub async fn change_leverage(
        &self,
        symbol: &str,
        leverage: u32,
    ) -> Result<LeverageInfo, ExchangeError> {
        self.signed_request(
            Method::POST,
            "/fapi/v1/leverage",
            vec![
                ("symbol", symbol.to_string()),
                ("leverage", leverage.to_string()),
            ],
        )
        .await
    }

    /// 마진 모드 변경.
    pub async fn change_margin_type(
        &self,
        symbol: &str,
        margin_type: &str,
    ) -> Result<(), ExchangeError> {
        let response: CodeMsgResponse = self
            .signed_request(
                Method::POST,
                "/fapi/v1/marginType",
                vec![
                    ("symbol", symbol.to_string()),
                    ("marginType", margin_type.to_string()),
                ],
            )
            .await?;
        if response.code == 200 {
            Ok(())
        } else {
            Err(map_api_error(response.code, response.msg))
        }
    }
}
