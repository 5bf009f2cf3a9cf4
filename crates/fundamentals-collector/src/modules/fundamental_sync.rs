//! 레이아웃 심볼 기준 Fundamental 데이터 동기화.
//!
//! ## 처리 순서
//!
//! 1. 저장된 모든 레이아웃에서 심볼 추출 (없으면 즉시 종료)
//! 2. 심볼을 고정 크기 청크로 분할 (기본 50개)
//! 3. 청크마다 순차적으로: 시세 조회 → upsert 문 생성 → 하나의 배치로 커밋
//!
//! 청크는 동시에 처리하지 않습니다. 실행 간 상태는 없으며 매 실행마다 레이아웃
//! 기준으로 다시 계산됩니다.

use std::sync::Arc;
use std::time::Instant;

use fundamentals_data::{build_upsert, FundamentalStore, FundamentalsSource, LayoutSource};
use tracing::{debug, error, info};

use super::symbol_discovery::discover_symbols;
use crate::config::{CommitFailurePolicy, FundamentalSyncConfig, DEFAULT_CHUNK_SIZE};
use crate::error::CollectorError;
use crate::stats::SyncStats;
use crate::Result;

/// 동기화 옵션.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// 청크당 심볼 수
    pub chunk_size: usize,
    /// 배치 커밋 실패 시 동작
    pub on_commit_error: CommitFailurePolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            on_commit_error: CommitFailurePolicy::Abort,
        }
    }
}

impl From<&FundamentalSyncConfig> for SyncOptions {
    fn from(config: &FundamentalSyncConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            on_commit_error: config.on_commit_error,
        }
    }
}

/// 심볼 목록을 순서를 유지한 채 `chunk_size` 이하 크기로 분할.
pub fn chunk_symbols(symbols: &[String], chunk_size: usize) -> Vec<&[String]> {
    symbols.chunks(chunk_size.max(1)).collect()
}

/// Fundamental 동기화 실행기.
///
/// 저장소와 시세 소스는 trait 객체로 주입받습니다.
#[derive(Clone)]
pub struct FundamentalSync {
    layouts: Arc<dyn LayoutSource>,
    source: Arc<dyn FundamentalsSource>,
    store: Arc<dyn FundamentalStore>,
    options: SyncOptions,
}

impl FundamentalSync {
    pub fn new(
        layouts: Arc<dyn LayoutSource>,
        source: Arc<dyn FundamentalsSource>,
        store: Arc<dyn FundamentalStore>,
        options: SyncOptions,
    ) -> Self {
        Self {
            layouts,
            source,
            store,
            options,
        }
    }

    /// 동기화 1회 실행.
    ///
    /// 레이아웃 조회 실패나 (abort 정책에서) 배치 커밋 실패 시 오류를 반환하며,
    /// 이미 커밋된 청크는 그대로 유지됩니다.
    pub async fn run(&self) -> Result<SyncStats> {
        let started = Instant::now();
        info!("전체 심볼 Fundamental 업데이트 시작");

        let discovered = discover_symbols(self.layouts.as_ref()).await?;

        let mut stats = SyncStats {
            layouts_scanned: discovered.layouts_scanned,
            layouts_skipped: discovered.layouts_skipped,
            symbols: discovered.symbols.len(),
            ..Default::default()
        };

        if discovered.symbols.is_empty() {
            info!("업데이트할 심볼 없음");
            stats.elapsed = started.elapsed();
            return Ok(stats);
        }

        let chunks = chunk_symbols(&discovered.symbols, self.options.chunk_size);
        stats.chunks = chunks.len();

        for (index, chunk) in chunks.into_iter().enumerate() {
            let chunk_no = index + 1;
            let records = self.source.fetch(chunk).await;
            stats.records_fetched += records.len();

            let statements: Vec<_> = records
                .iter()
                .map(|(symbol, record)| build_upsert(symbol, record))
                .collect();

            if statements.is_empty() {
                debug!(chunk = chunk_no, requested = chunk.len(), "저장할 Fundamental 없음");
                stats.chunks_processed += 1;
                continue;
            }

            match self.store.execute_batch(&statements).await {
                Ok(written) => {
                    stats.rows_written += written;
                    info!(
                        chunk = chunk_no,
                        total_chunks = stats.chunks,
                        requested = chunk.len(),
                        count = written,
                        "Fundamental 배치 업데이트 성공"
                    );
                }
                Err(e) => match self.options.on_commit_error {
                    CommitFailurePolicy::Abort => {
                        return Err(CollectorError::Commit {
                            chunk: chunk_no,
                            source: e,
                        });
                    }
                    CommitFailurePolicy::Continue => {
                        stats.chunks_failed += 1;
                        error!(
                            chunk = chunk_no,
                            error = %e,
                            "Fundamental 배치 커밋 실패, 다음 청크 계속"
                        );
                    }
                },
            }

            stats.chunks_processed += 1;
        }

        stats.elapsed = started.elapsed();
        info!("Fundamental 업데이트 완료!");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::test_support::{MemoryStore, StaticSource};
    use fundamentals_data::{FundamentalRecord, SqlParam};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn symbols(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("S{i:03}")).collect()
    }

    fn layout_with(symbols: &[String]) -> String {
        let widgets: Vec<_> = symbols
            .iter()
            .map(|s| serde_json::json!({ "type": "quote", "symbol": s.to_lowercase() }))
            .collect();
        serde_json::Value::Array(widgets).to_string()
    }

    fn sync_with(
        store: Arc<MemoryStore>,
        source: Arc<StaticSource>,
        options: SyncOptions,
    ) -> FundamentalSync {
        FundamentalSync::new(store.clone(), source, store, options)
    }

    #[test]
    fn test_chunk_symbols_partitions_in_order() {
        for n in [0usize, 1, 49, 50, 51, 100, 120] {
            let all = symbols(n);
            let chunks = chunk_symbols(&all, 50);

            assert_eq!(chunks.len(), n.div_ceil(50), "n = {n}");
            assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= 50));
            assert_eq!(chunks.concat(), all);
        }
    }

    #[test]
    fn test_chunk_symbols_zero_size_is_clamped() {
        let all = symbols(3);
        assert_eq!(chunk_symbols(&all, 0).len(), 3);
    }

    #[tokio::test]
    async fn test_no_symbols_means_no_fetch_and_no_writes() {
        let store = Arc::new(MemoryStore::with_layouts(&["[]", r#"[{"type": "news"}]"#, "oops"]));
        let source = Arc::new(StaticSource::default());

        let stats = sync_with(store.clone(), source.clone(), SyncOptions::default())
            .run()
            .await
            .unwrap();

        assert_eq!(stats.symbols, 0);
        assert_eq!(stats.chunks, 0);
        assert!(source.calls().is_empty());
        assert_eq!(store.batches_attempted(), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_single_layout() {
        let store = Arc::new(MemoryStore::with_layouts(&[r#"[{"symbol":"aapl"}]"#]));
        let mut records = BTreeMap::new();
        records.insert(
            "AAPL".to_string(),
            FundamentalRecord {
                eps: Some(dec!(5.2)),
                pe_ratio: Some(dec!(30.1)),
                ..Default::default()
            },
        );
        let source = Arc::new(StaticSource::new(records));

        let stats = sync_with(store.clone(), source.clone(), SyncOptions::default())
            .run()
            .await
            .unwrap();

        assert_eq!(source.calls(), vec![vec!["AAPL".to_string()]]);
        assert_eq!(store.batches_attempted(), 1);
        assert_eq!(stats.rows_written, 1);

        let row = store.row("AAPL").unwrap();
        assert_eq!(row.params.len(), 17);
        assert_eq!(row.params[10], SqlParam::Numeric(Some(dec!(5.2))));
        assert_eq!(row.params[15], SqlParam::Numeric(Some(dec!(30.1))));
        let nulls = row.params.iter().filter(|p| p.is_null()).count();
        assert_eq!(nulls, 14);
    }

    #[tokio::test]
    async fn test_chunk_without_valid_records_is_not_committed() {
        let all = symbols(60);
        let store = Arc::new(MemoryStore::with_layouts(&[layout_with(&all).as_str()]));
        // 두 번째 청크의 심볼만 유효
        let source = Arc::new(StaticSource::uniform(
            ["S055", "S056"],
            FundamentalRecord {
                eps: Some(dec!(1)),
                ..Default::default()
            },
        ));

        let stats = sync_with(store.clone(), source.clone(), SyncOptions::default())
            .run()
            .await
            .unwrap();

        assert_eq!(source.calls().len(), 2);
        assert_eq!(store.batches_attempted(), 1);
        assert_eq!(stats.chunks_processed, 2);
        assert_eq!(stats.rows_written, 2);
    }

    #[tokio::test]
    async fn test_repeated_run_overwrites_single_row() {
        let store = Arc::new(MemoryStore::with_layouts(&[r#"[{"symbol":"ko"}]"#]));
        let first = Arc::new(StaticSource::uniform(
            ["KO"],
            FundamentalRecord {
                eps: Some(dec!(2.5)),
                div_yield: Some(dec!(3.1)),
                ..Default::default()
            },
        ));
        sync_with(store.clone(), first, SyncOptions::default())
            .run()
            .await
            .unwrap();
        let before = store.row("KO").unwrap();

        let second = Arc::new(StaticSource::uniform(
            ["KO"],
            FundamentalRecord {
                eps: Some(dec!(2.7)),
                ..Default::default()
            },
        ));
        sync_with(store.clone(), second, SyncOptions::default())
            .run()
            .await
            .unwrap();
        let after = store.row("KO").unwrap();

        assert_eq!(store.row_count(), 1);
        assert_eq!(after.params[10], SqlParam::Numeric(Some(dec!(2.7))));
        // 이번 응답에 없는 필드는 NULL로 덮어씀
        assert_eq!(after.params[9], SqlParam::Numeric(None));
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn test_commit_failure_aborts_remaining_chunks() {
        let all = symbols(120);
        let store = Arc::new(MemoryStore::with_layouts(&[layout_with(&all).as_str()]).failing_on_batch(2));
        let source = Arc::new(StaticSource::uniform(
            all.iter().map(String::as_str),
            FundamentalRecord {
                eps: Some(dec!(1.0)),
                ..Default::default()
            },
        ));

        let result = sync_with(store.clone(), source.clone(), SyncOptions::default())
            .run()
            .await;

        assert!(matches!(result, Err(CollectorError::Commit { chunk: 2, .. })));
        // 청크 1만 커밋, 청크 3은 조회조차 하지 않음
        assert_eq!(source.calls().len(), 2);
        assert_eq!(store.batches_attempted(), 2);
        assert_eq!(store.row_count(), 50);
        assert!(all[..50].iter().all(|s| store.row(s).is_some()));
        assert!(all[50..].iter().all(|s| store.row(s).is_none()));
    }

    #[tokio::test]
    async fn test_commit_failure_with_continue_policy() {
        let all = symbols(120);
        let store = Arc::new(MemoryStore::with_layouts(&[layout_with(&all).as_str()]).failing_on_batch(2));
        let source = Arc::new(StaticSource::uniform(
            all.iter().map(String::as_str),
            FundamentalRecord {
                pe_ratio: Some(dec!(12.5)),
                ..Default::default()
            },
        ));
        let options = SyncOptions {
            on_commit_error: CommitFailurePolicy::Continue,
            ..Default::default()
        };

        let stats = sync_with(store.clone(), source.clone(), options)
            .run()
            .await
            .unwrap();

        assert_eq!(source.calls().len(), 3);
        assert_eq!(stats.chunks_failed, 1);
        assert_eq!(stats.chunks_processed, 3);
        assert_eq!(stats.rows_written, 70);
        assert_eq!(store.row_count(), 70);
        assert!(store.row("S060").is_none());
        assert!(store.row("S110").is_some());
    }
}
