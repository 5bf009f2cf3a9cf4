//! 시세(quote) API 클라이언트.
//!
//! 심볼 목록을 쉼표로 이어 한 번의 요청으로 Fundamental 데이터를 조회합니다.
//!
//! # 응답 형식
//!
//! ```json
//! {
//!   "AAPL": { "assetMainType": "EQUITY", "fundamental": { "eps": 6.08, "peRatio": 37.49 } },
//!   "XLF":  { "assetMainType": "ETF" }
//! }
//! ```
//!
//! # 실패 처리
//!
//! [`FundamentalsSource::fetch`]는 절대 오류를 반환하지 않습니다.
//! 전송 오류, 2xx 이외의 응답, 디코딩 실패는 모두 로그를 남기고 빈 결과로 대체되어
//! 한 청크의 실패가 전체 동기화를 중단시키지 않습니다.
//! 응답 본문은 종목 단위로 해석하므로, 형식이 어긋난 항목은 그 종목만 제외됩니다.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{DataError, Result};
use crate::fundamental::FundamentalRecord;

/// Fundamental 데이터를 저장할 자산 유형.
const EQUITY_ASSET_TYPE: &str = "EQUITY";

/// 심볼 목록 단위 Fundamental 조회 trait.
#[async_trait]
pub trait FundamentalsSource: Send + Sync {
    /// 심볼 목록의 Fundamental 데이터 조회.
    ///
    /// 유효한 EQUITY 종목만 포함된 `심볼 -> 레코드` 맵을 반환합니다.
    /// 실패 시 빈 맵을 반환합니다.
    async fn fetch(&self, symbols: &[String]) -> BTreeMap<String, FundamentalRecord>;
}

/// 시세 API 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct QuoteClientConfig {
    /// API Base URL (예: `https://finance.learningis1.st`)
    pub base_url: String,
    /// 요청 타임아웃
    pub timeout: Duration,
}

impl Default for QuoteClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://finance.learningis1.st".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// 시세 API 클라이언트.
#[derive(Clone)]
pub struct QuoteClient {
    client: reqwest::Client,
    base_url: String,
}

impl QuoteClient {
    /// 새 클라이언트 생성.
    pub fn new(config: QuoteClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn quote_url(&self) -> String {
        format!("{}/quote", self.base_url)
    }

    /// 시세 API 호출 및 응답 디코딩.
    async fn request_quotes(
        &self,
        symbol_list: &str,
    ) -> Result<HashMap<String, Value>> {
        let response = self
            .client
            .get(self.quote_url())
            .query(&[("symbol", symbol_list), ("fields", "fundamental")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::UpstreamStatus(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| DataError::ParseError(format!("quote 응답 파싱 실패: {}", e)))
    }
}

#[async_trait]
impl FundamentalsSource for QuoteClient {
    async fn fetch(&self, symbols: &[String]) -> BTreeMap<String, FundamentalRecord> {
        if symbols.is_empty() {
            return BTreeMap::new();
        }

        let symbol_list = symbols.join(",");
        info!(count = symbols.len(), symbols = %symbol_list, "Fundamental 데이터 조회");

        match self.request_quotes(&symbol_list).await {
            Ok(entries) => select_equities(symbols, entries),
            Err(DataError::UpstreamStatus(status)) => {
                error!(status, symbols = %symbol_list, "Fundamental 조회 실패 (비정상 응답)");
                BTreeMap::new()
            }
            Err(e) => {
                error!(error = %e, symbols = %symbol_list, "Fundamental 조회 중 오류");
                BTreeMap::new()
            }
        }
    }
}

/// 응답 항목 중 EQUITY + Fundamental 페이로드가 있는 종목만 선별.
///
/// 항목은 개별적으로 해석하며, 형식이 맞지 않는 항목은 해당 종목만 건너뜁니다.
fn select_equities(
    requested: &[String],
    entries: HashMap<String, Value>,
) -> BTreeMap<String, FundamentalRecord> {
    for symbol in requested {
        if !entries.contains_key(symbol) {
            debug!(symbol = %symbol, "응답에 심볼 없음");
        }
    }

    let mut valid = BTreeMap::new();

    for (symbol, entry) in entries {
        if entry.is_null() {
            warn!(symbol = %symbol, "데이터가 반환되지 않음");
            continue;
        }

        let asset_main_type = entry.get("assetMainType").and_then(Value::as_str);
        if asset_main_type != Some(EQUITY_ASSET_TYPE) {
            info!(
                symbol = %symbol,
                asset_main_type = ?asset_main_type,
                "Fundamental 건너뜀: EQUITY 아님"
            );
            continue;
        }

        let fundamental = match entry.get("fundamental") {
            Some(value) if !value.is_null() => value,
            _ => {
                info!(symbol = %symbol, "Fundamental 건너뜀: fundamental 데이터 없음");
                continue;
            }
        };

        match FundamentalRecord::deserialize(fundamental) {
            Ok(record) if !record.is_empty() => {
                valid.insert(symbol, record);
            }
            Ok(_) => {
                info!(symbol = %symbol, "Fundamental 건너뜀: fundamental 데이터 없음");
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Fundamental 건너뜀: 형식 오류");
            }
        }
    }

    valid
}
