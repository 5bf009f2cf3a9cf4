//! 에러 타입 정의.

use fundamentals_data::DataError;
use thiserror::Error;

/// Collector 에러 타입
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 데이터 소스/저장소 에러
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// 청크 배치 커밋 실패 (동기화 중단)
    #[error("Batch commit failed for chunk {chunk}: {source}")]
    Commit {
        chunk: usize,
        #[source]
        source: DataError,
    },

    /// 백그라운드 태스크 실패 (panic 또는 취소)
    #[error("Background task failed: {0}")]
    Task(String),

    /// I/O 에러 (헬스 체크 서버 바인딩 등)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
