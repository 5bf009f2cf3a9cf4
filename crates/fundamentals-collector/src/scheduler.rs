//! 예약 실행 트리거.
//!
//! 트리거마다 동기화를 백그라운드 태스크로 띄우고 [`JoinHandle`]을 돌려줍니다.
//! 동기화 오류와 panic은 모두 [`SyncOutcome`]으로 변환되어 로그로만 관찰되며,
//! 호스트 프로세스(헬스 체크 서버 포함)로 전파되지 않습니다.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::CollectorError;
use crate::modules::FundamentalSync;
use crate::stats::SyncStats;

/// 동기화 태스크 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// 정상 완료 (일부 청크 실패 포함 가능)
    Completed(SyncStats),
    /// 중단됨 (사유)
    Failed(String),
}

impl SyncOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SyncOutcome::Completed(_))
    }
}

/// 최상위 복구 경계: 동기화 오류를 결과로 변환.
pub async fn run_guarded(sync: &FundamentalSync) -> SyncOutcome {
    match sync.run().await {
        Ok(stats) => {
            stats.log_summary("Fundamental 동기화");
            SyncOutcome::Completed(stats)
        }
        Err(e) => {
            error!(error = %e, "Fundamental 업데이트 중 오류");
            SyncOutcome::Failed(e.to_string())
        }
    }
}

/// Fundamental 동기화 스케줄러.
#[derive(Clone)]
pub struct SyncScheduler {
    sync: FundamentalSync,
}

impl SyncScheduler {
    pub fn new(sync: FundamentalSync) -> Self {
        Self { sync }
    }

    /// 예약 실행 진입점. 동기화를 백그라운드 태스크로 시작합니다.
    pub fn trigger(&self) -> JoinHandle<SyncOutcome> {
        info!("Fundamental 동기화 트리거");
        let sync = self.sync.clone();
        tokio::spawn(async move { run_guarded(&sync).await })
    }

    /// 트리거 후 태스크 완료까지 대기.
    ///
    /// 태스크가 panic으로 끝나도 `Failed`로 변환합니다.
    pub async fn trigger_and_wait(&self) -> SyncOutcome {
        match self.trigger().await {
            Ok(outcome) => outcome,
            Err(e) => {
                let err = CollectorError::Task(e.to_string());
                error!(error = %err, "동기화 태스크 비정상 종료");
                SyncOutcome::Failed(err.to_string())
            }
        }
    }

    /// 주기적으로 동기화 실행 (시작 시 1회 즉시 실행).
    ///
    /// 실행 중에 지난 tick은 건너뛰며, 종료 시그널은 진행 중인 실행이 끝난 뒤 반영됩니다.
    pub async fn run_every(&self, period: Duration, shutdown: CancellationToken) {
        info!(interval_secs = period.as_secs(), "Fundamental 동기화 스케줄러 시작");

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("종료 신호 수신, 스케줄러 종료 중...");
                    break;
                }
                _ = ticker.tick() => {
                    self.trigger_and_wait().await;
                    info!(
                        next_in_secs = period.as_secs(),
                        "동기화 실행 완료, 다음 실행 대기"
                    );
                }
            }
        }

        info!("Fundamental 동기화 스케줄러 종료됨");
    }
}
