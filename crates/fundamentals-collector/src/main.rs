//! Fundamentals collector CLI.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use fundamentals_collector::{
    health::serve_health, modules, CollectorConfig, FundamentalSync, SyncOptions, SyncOutcome,
    SyncScheduler,
};
use fundamentals_data::{Database, PgStore, QuoteClient};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fundamentals-collector")]
#[command(about = "Dashboard layout fundamentals collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Fundamental 동기화 1회 실행
    RunOnce,

    /// 데몬 모드: 헬스 체크 서버 + 주기적 동기화
    Daemon,

    /// equity_fundamentals 테이블 생성 (마이그레이션 적용)
    InitSchema,

    /// 레이아웃에서 추출한 심볼 목록 출력
    Discover,

    /// 저장된 Fundamental 행 조회
    Show {
        /// 조회할 심볼 (예: AAPL)
        symbol: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "fundamentals_collector={0},fundamentals_data={0}",
                    cli.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Fundamentals Collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()?;
    tracing::debug!(
        quote_api = %config.quote_api.base_url,
        chunk_size = config.fundamental_sync.chunk_size,
        "설정 로드 완료"
    );

    // DB 풀 생성 (첫 쿼리 시점에 연결)
    // 데몬 모드에서 DB가 내려가 있어도 헬스 체크 서버는 먼저 응답할 수 있어야 함
    let db = Database::connect_lazy(&config.database())?;
    let store = Arc::new(PgStore::new(db.clone()));

    // 명령 실행
    let result = run_command(cli.command, &config, store).await;

    db.close().await;
    tracing::info!("Fundamentals Collector 종료");

    result
}

async fn run_command(
    command: Commands,
    config: &CollectorConfig,
    store: Arc<PgStore>,
) -> anyhow::Result<()> {
    match command {
        Commands::InitSchema => {
            store.database().migrate().await?;
            tracing::info!("스키마 준비 완료");
        }
        Commands::Discover => {
            let discovered = modules::discover_symbols(store.as_ref()).await?;
            tracing::info!(
                layouts = discovered.layouts_scanned,
                skipped = discovered.layouts_skipped,
                symbols = discovered.symbols.len(),
                "심볼 추출 완료"
            );
            for symbol in &discovered.symbols {
                println!("{symbol}");
            }
        }
        Commands::Show { symbol } => {
            let symbol = symbol.trim().to_uppercase();
            match store.find_by_symbol(&symbol).await? {
                Some(row) => println!("{}", serde_json::to_string_pretty(&row)?),
                None => tracing::warn!(symbol = %symbol, "저장된 Fundamental 데이터 없음"),
            }
        }
        Commands::RunOnce => {
            let scheduler = build_scheduler(config, store)?;
            if let SyncOutcome::Failed(reason) = scheduler.trigger_and_wait().await {
                anyhow::bail!("Fundamental 동기화 실패: {reason}");
            }
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );

            let shutdown = CancellationToken::new();

            // 헬스 체크 서버를 동기화보다 먼저 시작
            let health_addr = config.health.socket_addr()?;
            let health = tokio::spawn(serve_health(health_addr, shutdown.clone()));

            {
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    shutdown_signal().await;
                    shutdown.cancel();
                });
            }

            let scheduler = build_scheduler(config, store);
            if let Ok(scheduler) = &scheduler {
                scheduler
                    .run_every(config.daemon.interval(), shutdown.clone())
                    .await;
            }

            shutdown.cancel();
            match health.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "헬스 체크 서버 오류"),
                Err(e) => tracing::error!(error = %e, "헬스 체크 서버 태스크 실패"),
            }

            scheduler?;
        }
    }

    Ok(())
}

fn build_scheduler(config: &CollectorConfig, store: Arc<PgStore>) -> anyhow::Result<SyncScheduler> {
    let source = Arc::new(QuoteClient::new(config.quote_api.client_config())?);
    let sync = FundamentalSync::new(
        store.clone(),
        source,
        store,
        SyncOptions::from(&config.fundamental_sync),
    );
    Ok(SyncScheduler::new(sync))
}

/// Ctrl+C 또는 SIGTERM 대기.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C 핸들러 설치 실패");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM 핸들러 설치 실패");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl+C 수신, 진행 중인 동기화 완료 후 종료"),
        _ = terminate => tracing::info!("SIGTERM 수신, 진행 중인 동기화 완료 후 종료"),
    }
}
