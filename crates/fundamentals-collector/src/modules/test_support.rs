//! 테스트용 인메모리 저장소 및 시세 소스.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use fundamentals_data::{
    DataError, FundamentalRecord, FundamentalStore, FundamentalsSource, LayoutSource, SqlParam,
    UpsertStatement,
};

/// 저장된 행 (파라미터 + 갱신 순번).
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub params: Vec<SqlParam>,
    pub updated_at: u64,
}

#[derive(Default)]
struct StoreState {
    rows: BTreeMap<String, StoredRow>,
    batches_attempted: usize,
    clock: u64,
}

/// `equity_fundamentals` upsert 의미를 흉내내는 인메모리 저장소.
#[derive(Default)]
pub struct MemoryStore {
    layouts: Vec<String>,
    /// 이 순번(1부터)의 배치 커밋을 실패시킴
    fail_on_batch: Option<usize>,
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn with_layouts(layouts: &[&str]) -> Self {
        Self {
            layouts: layouts.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing_on_batch(mut self, batch: usize) -> Self {
        self.fail_on_batch = Some(batch);
        self
    }

    pub fn row(&self, symbol: &str) -> Option<StoredRow> {
        self.state.lock().unwrap().rows.get(symbol).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.state.lock().unwrap().rows.len()
    }

    pub fn batches_attempted(&self) -> usize {
        self.state.lock().unwrap().batches_attempted
    }
}

#[async_trait]
impl LayoutSource for MemoryStore {
    async fn load_layouts(&self) -> fundamentals_data::Result<Vec<String>> {
        Ok(self.layouts.clone())
    }
}

#[async_trait]
impl FundamentalStore for MemoryStore {
    async fn execute_batch(&self, statements: &[UpsertStatement]) -> fundamentals_data::Result<usize> {
        let mut state = self.state.lock().unwrap();
        state.batches_attempted += 1;

        if self.fail_on_batch == Some(state.batches_attempted) {
            return Err(DataError::QueryError("simulated commit failure".to_string()));
        }

        // 원자성: 모든 문을 검증한 뒤 한 번에 반영
        let mut staged = Vec::with_capacity(statements.len());
        for statement in statements {
            let symbol = statement
                .symbol()
                .ok_or_else(|| DataError::QueryError("symbol is null".to_string()))?;
            staged.push((symbol.to_string(), statement.params().to_vec()));
        }

        for (symbol, params) in staged {
            state.clock += 1;
            let updated_at = state.clock;
            state.rows.insert(symbol, StoredRow { params, updated_at });
        }

        Ok(statements.len())
    }
}

/// 고정 응답을 반환하는 시세 소스. 호출 기록을 남깁니다.
#[derive(Default)]
pub struct StaticSource {
    records: BTreeMap<String, FundamentalRecord>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl StaticSource {
    pub fn new(records: BTreeMap<String, FundamentalRecord>) -> Self {
        Self {
            records,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 모든 심볼에 같은 레코드를 반환
    pub fn uniform<'a>(symbols: impl IntoIterator<Item = &'a str>, record: FundamentalRecord) -> Self {
        Self::new(
            symbols
                .into_iter()
                .map(|s| (s.to_string(), record.clone()))
                .collect(),
        )
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FundamentalsSource for StaticSource {
    async fn fetch(&self, symbols: &[String]) -> BTreeMap<String, FundamentalRecord> {
        self.calls.lock().unwrap().push(symbols.to_vec());

        symbols
            .iter()
            .filter_map(|s| self.records.get(s).map(|r| (s.clone(), r.clone())))
            .collect()
    }
}
