//! Fundamental 데이터 수집 및 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - 시세(quote) API 클라이언트: 심볼 목록 단위로 펀더멘털 조회
//! - 펀더멘털 레코드 모델 및 날짜 정규화
//! - `equity_fundamentals` upsert 문 빌더
//! - 레이아웃 조회 / 배치 커밋 저장소 trait 및 PostgreSQL 구현

pub mod error;
pub mod fundamental;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};
pub use fundamental::{normalize_date, FundamentalRecord};

// Provider 재내보내기
pub use provider::{FundamentalsSource, QuoteClient, QuoteClientConfig};

// 저장소 타입 재내보내기
pub use storage::postgres::{Database, DatabaseConfig, EquityFundamentalsRow, PgStore};
pub use storage::upsert::{build_upsert, SqlParam, UpsertStatement, UPSERT_FUNDAMENTAL_SQL};
pub use storage::{FundamentalStore, LayoutSource};
