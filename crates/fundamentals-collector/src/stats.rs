//! 동기화 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fundamental 동기화 1회 실행 통계
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncStats {
    /// 조회한 레이아웃 수
    pub layouts_scanned: usize,
    /// 파싱 실패로 건너뛴 레이아웃 수
    pub layouts_skipped: usize,
    /// 중복 제거된 심볼 수
    pub symbols: usize,
    /// 전체 청크 수
    pub chunks: usize,
    /// 처리를 시도한 청크 수 (커밋 실패 포함)
    pub chunks_processed: usize,
    /// 커밋 실패한 청크 수 (continue 정책에서만 증가)
    pub chunks_failed: usize,
    /// 유효 레코드 수 (EQUITY + fundamental)
    pub records_fetched: usize,
    /// 커밋된 upsert 수
    pub rows_written: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SyncStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 요청한 심볼 대비 유효 레코드 비율 (%)
    pub fn coverage_rate(&self) -> f64 {
        if self.symbols == 0 {
            0.0
        } else {
            (self.records_fetched as f64 / self.symbols as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            layouts = self.layouts_scanned,
            layouts_skipped = self.layouts_skipped,
            symbols = self.symbols,
            chunks = self.chunks,
            chunks_processed = self.chunks_processed,
            chunks_failed = self.chunks_failed,
            fetched = self.records_fetched,
            written = self.rows_written,
            coverage = format!("{:.1}%", self.coverage_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "동기화 완료"
        );
    }
}
