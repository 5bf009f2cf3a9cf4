//! 대시보드 레이아웃 심볼 Fundamental 동기화.
//!
//! 이 crate는 다음을 제공합니다:
//! - 사용자 레이아웃에서 심볼 추출
//! - 청크 단위 Fundamental 조회 및 배치 upsert
//! - 주기 실행 스케줄러 (백그라운드 태스크)
//! - 헬스 체크 endpoint

pub mod config;
pub mod error;
pub mod health;
pub mod modules;
pub mod scheduler;
pub mod stats;

pub use config::{CollectorConfig, CommitFailurePolicy};
pub use error::{CollectorError, Result};
pub use modules::{FundamentalSync, SyncOptions};
pub use scheduler::{run_guarded, SyncOutcome, SyncScheduler};
pub use stats::SyncStats;
