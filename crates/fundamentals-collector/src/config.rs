//! 환경변수 기반 설정 모듈.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use fundamentals_data::{DatabaseConfig, QuoteClientConfig};

use crate::error::CollectorError;
use crate::Result;

/// 기본 청크 크기 (요청 URL 길이 및 배치 커밋 크기 제한)
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// 데몬 실행 주기 상한 (1년, 분 단위)
pub const MAX_INTERVAL_MINUTES: u64 = 365 * 24 * 60;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 URL
    pub database_url: String,
    /// 시세 API 설정
    pub quote_api: QuoteApiConfig,
    /// Fundamental 동기화 설정
    pub fundamental_sync: FundamentalSyncConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
    /// 헬스 체크 서버 설정
    pub health: HealthConfig,
}

/// 시세 API 설정
#[derive(Debug, Clone)]
pub struct QuoteApiConfig {
    /// API Base URL
    pub base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

/// Fundamental 동기화 설정
#[derive(Debug, Clone)]
pub struct FundamentalSyncConfig {
    /// 청크당 심볼 수
    pub chunk_size: usize,
    /// 배치 커밋 실패 시 동작
    pub on_commit_error: CommitFailurePolicy,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 동기화 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

/// 헬스 체크 서버 설정
#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub host: String,
    pub port: u16,
}

/// 청크 배치 커밋 실패 시 동작.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitFailurePolicy {
    /// 동기화 중단 (이미 커밋된 청크는 유지, 남은 청크는 처리하지 않음)
    #[default]
    Abort,
    /// 실패한 청크를 기록하고 다음 청크 계속 처리
    Continue,
}

impl FromStr for CommitFailurePolicy {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "continue" | "skip" => Ok(Self::Continue),
            other => Err(CollectorError::Config(format!(
                "알 수 없는 커밋 실패 정책: {other} (abort | continue)"
            ))),
        }
    }
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 키 조회 함수로부터 설정 로드
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or_else(|| {
            CollectorError::Config("DATABASE_URL 환경변수가 설정되지 않았습니다".to_string())
        })?;

        let on_commit_error = match lookup("FUNDAMENTAL_ON_COMMIT_ERROR") {
            Some(value) => value.parse()?,
            None => CommitFailurePolicy::default(),
        };

        let defaults = QuoteClientConfig::default();

        Ok(Self {
            database_url,
            quote_api: QuoteApiConfig {
                base_url: lookup("QUOTE_API_BASE_URL").unwrap_or(defaults.base_url),
                timeout_secs: parse_or(&lookup, "QUOTE_API_TIMEOUT_SECS", defaults.timeout.as_secs()),
            },
            fundamental_sync: FundamentalSyncConfig {
                chunk_size: parse_or(&lookup, "FUNDAMENTAL_CHUNK_SIZE", DEFAULT_CHUNK_SIZE).max(1),
                on_commit_error,
            },
            daemon: DaemonConfig {
                interval_minutes: parse_or(&lookup, "DAEMON_INTERVAL_MINUTES", 60_u64)
                    .clamp(1, MAX_INTERVAL_MINUTES),
            },
            health: HealthConfig {
                host: lookup("HEALTH_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "HEALTH_PORT", 8080),
            },
        })
    }

    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone())
    }
}

impl QuoteApiConfig {
    pub fn client_config(&self) -> QuoteClientConfig {
        QuoteClientConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl DaemonConfig {
    /// 동기화 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }
}

impl HealthConfig {
    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 설정 에러를 반환합니다.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| CollectorError::Config(format!("헬스 체크 주소가 유효하지 않습니다: {e}")))
    }
}

/// 값을 파싱 (없거나 실패 시 기본값 사용)
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
