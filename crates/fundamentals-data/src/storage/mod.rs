//! 저장소 모듈.
//!
//! 동기화 파이프라인은 저장소를 두 개의 trait으로만 사용합니다:
//! - [`LayoutSource`]: 사용자 레이아웃 원본 조회 (읽기 전용)
//! - [`FundamentalStore`]: upsert 문 묶음을 하나의 트랜잭션으로 커밋

pub mod postgres;
pub mod upsert;

use async_trait::async_trait;

use crate::error::Result;
use upsert::UpsertStatement;

/// 저장된 대시보드 레이아웃 조회.
#[async_trait]
pub trait LayoutSource: Send + Sync {
    /// 내용이 NULL이 아닌 모든 레이아웃의 직렬화된 원본.
    async fn load_layouts(&self) -> Result<Vec<String>>;
}

/// Fundamental upsert 배치 커밋.
#[async_trait]
pub trait FundamentalStore: Send + Sync {
    /// 모든 문을 하나의 원자적 배치로 실행.
    ///
    /// 하나라도 실패하면 배치 전체가 롤백되고 오류를 반환합니다.
    /// 성공 시 실행된 문 개수를 반환합니다.
    async fn execute_batch(&self, statements: &[UpsertStatement]) -> Result<usize>;
}
