//! 환경변수 기반 Binance 선물 설정.

use secrecy::{ExposeSecret, SecretString};

use futrader_core::ExchangeError;

/// Binance USDT-M 선물 메인넷 REST 엔드포인트.
pub const MAINNET_BASE_URL: &str = "https://fapi.binance.com";
/// Binance USDT-M 선물 테스트넷 REST 엔드포인트.
pub const TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";

/// Binance 선물 API 접속 설정.
#[derive(Clone)]
pub struct BinanceFuturesConfig {
    /// API 키
    pub api_key: String,
    /// API 시크릿 (서명용)
    pub api_secret: SecretString,
    /// REST 베이스 URL
    pub base_url: String,
    /// 서명 요청 유효 시간 (밀리초)
    pub recv_window: u64,
}

impl std::fmt::Debug for BinanceFuturesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceFuturesConfig")
            .field("api_key", &"***")
            .field("api_secret", &"***")
            .field("base_url", &self.base_url)
            .field("recv_window", &self.recv_window)
            .finish()
    }
}

impl BinanceFuturesConfig {
    /// 키 쌍으로 설정 생성 (메인넷 기본값).
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: SecretString::from(api_secret.into()),
            base_url: MAINNET_BASE_URL.to_string(),
            recv_window: 5_000,
        }
    }

    /// 환경변수에서 설정 로드.
    ///
    /// `.env` 파일이 있으면 먼저 읽습니다. 필요한 변수:
    /// - `BINANCE_ACCESS_KEY`
    /// - `BINANCE_SECRET_KEY`
    /// - `BINANCE_FUTURES_BASE_URL` (선택, 기본 메인넷)
    pub fn from_env() -> Result<Self, ExchangeError> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("BINANCE_ACCESS_KEY")
            .map_err(|_| ExchangeError::Authentication("BINANCE_ACCESS_KEY 미설정".to_string()))?;
        let api_secret = std::env::var("BINANCE_SECRET_KEY")
            .map_err(|_| ExchangeError::Authentication("BINANCE_SECRET_KEY 미설정".to_string()))?;

        let mut config = Self::new(api_key, api_secret);
        if let Ok(base_url) = std::env::var("BINANCE_FUTURES_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    /// 베이스 URL 교체 (테스트넷/mock 서버용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 서명용 시크릿 바이트.
    pub(crate) fn secret_bytes(&self) -> &[u8] {
        self.api_secret.expose_secret().as_bytes()
    }
}
