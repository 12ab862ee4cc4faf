//! 파이프라인 오케스트레이션 -- 로그 tail 태스크의 생명주기를 관리합니다.
//!
//! [`LogPipeline`]은 core의 [`Pipeline`](hotspot_core::pipeline::Pipeline) trait을 구현하여
//! `hotspot-daemon`에서 start/stop/health_check로 관리됩니다.
//!
//! # 내부 아키텍처
//! ```text
//! notify -> mpsc -> LogTail -> LineDecoder -> LiveTraffic (EventBuffer + ActivityTracker)
//!                                                  ^
//!                                       HTTP handlers (read-only)
//! ```

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use hotspot_core::error::{HotspotError, PipelineError};
use hotspot_core::pipeline::{HealthStatus, Pipeline};

use crate::collector::{CollectorStatus, LogTail};
use crate::config::PipelineConfig;
use crate::error::LogPipelineError;
use crate::parser::LineDecoder;
use crate::traffic::LiveTraffic;

/// stop 시 tail 태스크 종료 대기 시간
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

type TailTask = JoinHandle<(LogTail, Result<(), LogPipelineError>)>;

/// 파이프라인 실행 상태
#[derive(Debug, Clone, PartialEq, Eq)]
enum PipelineState {
    /// 초기화됨, 아직 시작하지 않음
    Initialized,
    /// 실행 중
    Running,
    /// 정지됨
    Stopped,
}

/// 로그 파이프라인 -- MMDVMHost 로그 수집과 라이브 트래픽 버퍼를 관리합니다.
///
/// # 사용 예시
/// ```ignore
/// use hotspot_log_pipeline::LogPipelineBuilder;
///
/// let mut pipeline = LogPipelineBuilder::new().config(config).build()?;
/// let traffic = pipeline.traffic();
///
/// pipeline.start().await?;
/// let recent = traffic.recent(50);
/// ```
pub struct LogPipeline {
    config: PipelineConfig,
    state: PipelineState,
    decoder: Arc<LineDecoder>,
    traffic: LiveTraffic,
    /// 정지 상태에서 보관하는 tail (오프셋 유지)
    tail: Option<LogTail>,
    tail_status: Arc<RwLock<CollectorStatus>>,
    cancel: Option<CancellationToken>,
    task: Option<TailTask>,
}

impl LogPipeline {
    /// 현재 상태를 반환합니다.
    pub fn state_name(&self) -> &str {
        match self.state {
            PipelineState::Initialized => "initialized",
            PipelineState::Running => "running",
            PipelineState::Stopped => "stopped",
        }
    }

    /// 라이브 트래픽 핸들 (복제본)
    pub fn traffic(&self) -> LiveTraffic {
        self.traffic.clone()
    }

    /// 파이프라인 설정
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// tail 수집기 상태
    pub fn collector_status(&self) -> CollectorStatus {
        self.tail_status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn take_tail(&mut self) -> LogTail {
        match self.tail.take() {
            Some(tail) => tail,
            None => {
                // 이전 태스크가 패닉한 경우 새 tail로 대체
                let tail = LogTail::new(&self.config, Arc::clone(&self.decoder), self.traffic.clone());
                self.tail_status = tail.status_handle();
                tail
            }
        }
    }
}

impl Pipeline for LogPipeline {
    async fn start(&mut self) -> Result<(), HotspotError> {
        if self.state == PipelineState::Running {
            return Err(PipelineError::AlreadyRunning.into());
        }

        tracing::info!(log_dir = %self.config.log_dir.display(), "starting log pipeline");

        let mut tail = self.take_tail();
        let cancel = CancellationToken::new();
        let token = cancel.child_token();

        self.task = Some(tokio::spawn(async move {
            let result = tail.run(token).await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "log tail failed");
            }
            (tail, result)
        }));
        self.cancel = Some(cancel);
        self.state = PipelineState::Running;

        tracing::info!("log pipeline started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), HotspotError> {
        if self.state != PipelineState::Running {
            return Err(PipelineError::NotRunning.into());
        }

        tracing::info!("stopping log pipeline");

        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }

        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(STOP_TIMEOUT, &mut task).await {
                Ok(Ok((tail, _))) => self.tail = Some(tail),
                Ok(Err(e)) => tracing::warn!(error = %e, "log tail task panicked"),
                Err(_) => {
                    tracing::warn!("log tail did not stop in time, aborting");
                    task.abort();
                }
            }
        }

        self.state = PipelineState::Stopped;
        tracing::info!("log pipeline stopped");
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        match self.state {
            PipelineState::Running => match self.collector_status() {
                CollectorStatus::Error(reason) => HealthStatus::Degraded(reason),
                CollectorStatus::Stopped => {
                    HealthStatus::Degraded("log tail exited".to_owned())
                }
                CollectorStatus::Idle | CollectorStatus::Running => HealthStatus::Healthy,
            },
            PipelineState::Initialized => HealthStatus::Unhealthy("not started".to_owned()),
            PipelineState::Stopped => HealthStatus::Unhealthy("stopped".to_owned()),
        }
    }
}

/// 로그 파이프라인 빌더
pub struct LogPipelineBuilder {
    config: PipelineConfig,
    decoder: Option<LineDecoder>,
}

impl LogPipelineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            decoder: None,
        }
    }

    /// 파이프라인 설정을 지정합니다.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// 기본 매처 대신 사용할 디코더를 지정합니다.
    pub fn decoder(mut self, decoder: LineDecoder) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// 파이프라인을 빌드합니다.
    pub fn build(self) -> Result<LogPipeline, LogPipelineError> {
        self.config.validate()?;

        let decoder = Arc::new(match self.decoder {
            Some(decoder) => decoder,
            None => LineDecoder::with_defaults()?,
        });
        let traffic = LiveTraffic::new(&self.config);
        let tail = LogTail::new(&self.config, Arc::clone(&decoder), traffic.clone());
        let tail_status = tail.status_handle();

        Ok(LogPipeline {
            config: self.config,
            state: PipelineState::Initialized,
            decoder,
            traffic,
            tail: Some(tail),
            tail_status,
            cancel: None,
            task: None,
        })
    }
}

impl Default for LogPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
