//! 로그 파이프라인 설정
//!
//! [`PipelineConfig`]는 core의 [`HotspotConfig`](hotspot_core::config::HotspotConfig)에서
//! 로그 디렉토리(`paths`)와 파이프라인 섹션(`log_pipeline`)을 모아 만듭니다.
//!
//! # 사용 예시
//! ```ignore
//! use hotspot_core::config::HotspotConfig;
//! use hotspot_log_pipeline::config::PipelineConfig;
//!
//! let core_config = HotspotConfig::default();
//! let config = PipelineConfig::from_core(&core_config);
//! ```

use std::path::{Component, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LogPipelineError;

/// 버퍼 최대 용량 상한
const MAX_BUFFER_CAPACITY: usize = 1_000_000;

/// 로그 파이프라인 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// MMDVMHost 로그 디렉토리
    pub log_dir: PathBuf,
    /// 로그 파일명 접두어 (`<prefix>-YYYY-MM-DD.log`)
    pub file_prefix: String,
    /// 이벤트 버퍼 용량
    pub buffer_capacity: usize,
    /// `recent()` 한 번에 반환하는 최대 이벤트 수
    pub max_recent: usize,
    /// running 판단 활동 윈도우 (초)
    pub activity_window_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("/var/log/pi-star"),
            file_prefix: "MMDVM".to_owned(),
            buffer_capacity: 500,
            max_recent: 100,
            activity_window_secs: 300,
        }
    }
}

impl PipelineConfig {
    /// core 설정에서 파이프라인 설정을 생성합니다.
    pub fn from_core(core: &hotspot_core::config::HotspotConfig) -> Self {
        Self {
            log_dir: PathBuf::from(&core.paths.log_dir),
            file_prefix: core.log_pipeline.file_prefix.clone(),
            buffer_capacity: core.log_pipeline.buffer_capacity,
            max_recent: core.log_pipeline.max_recent,
            activity_window_secs: core.log_pipeline.activity_window_secs,
        }
    }

    /// 활동 윈도우를 `Duration`으로 반환합니다.
    pub fn activity_window(&self) -> Duration {
        Duration::from_secs(self.activity_window_secs)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        if self.log_dir.as_os_str().is_empty() {
            return Err(LogPipelineError::Config {
                field: "log_dir".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self
            .log_dir
            .components()
            .any(|c| c == Component::ParentDir)
        {
            return Err(LogPipelineError::Config {
                field: "log_dir".to_owned(),
                reason: format!(
                    "log dir '{}' contains path traversal pattern '..'",
                    self.log_dir.display()
                ),
            });
        }

        if self.file_prefix.is_empty()
            || self
                .file_prefix
                .chars()
                .any(|c| c == '/' || c == '\\' || c == '*' || c == '?')
        {
            return Err(LogPipelineError::Config {
                field: "file_prefix".to_owned(),
                reason: "must be a non-empty plain file name prefix".to_owned(),
            });
        }

        if self.buffer_capacity == 0 || self.buffer_capacity > MAX_BUFFER_CAPACITY {
            return Err(LogPipelineError::Config {
                field: "buffer_capacity".to_owned(),
                reason: format!("must be 1-{}", MAX_BUFFER_CAPACITY),
            });
        }

        if self.max_recent == 0 {
            return Err(LogPipelineError::Config {
                field: "max_recent".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.activity_window_secs == 0 {
            return Err(LogPipelineError::Config {
                field: "activity_window_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

/// 파이프라인 설정 빌더
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 로그 디렉토리를 설정합니다.
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = dir.into();
        self
    }

    /// 로그 파일 접두어를 설정합니다.
    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.file_prefix = prefix.into();
        self
    }

    /// 버퍼 용량을 설정합니다.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity;
        self
    }

    /// 최대 조회 개수를 설정합니다.
    pub fn max_recent(mut self, max_recent: usize) -> Self {
        self.config.max_recent = max_recent;
        self
    }

    /// 활동 윈도우(초)를 설정합니다.
    pub fn activity_window_secs(mut self, secs: u64) -> Self {
        self.config.activity_window_secs = secs;
        self
    }

    /// 설정을 검증하고 `PipelineConfig`를 생성합니다.
    pub fn build(self) -> Result<PipelineConfig, LogPipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
