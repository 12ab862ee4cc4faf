//! 활동 추적 -- 마지막 디코딩 시각으로 MMDVMHost 서비스 상태를 추정
//!
//! 프로세스를 직접 감시하지 않고, 로그에서 이벤트가 마지막으로 디코딩된 시각만
//! 기록합니다. 상태는 조회 시점에 계산되는 파생 값입니다.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};

use hotspot_core::types::{ServiceState, ServiceStatus};

/// 마지막 활동 시각 추적기
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    last_activity: Option<DateTime<Utc>>,
    window: Duration,
}

impl ActivityTracker {
    /// `window` 이내의 활동이 있으면 running으로 판단하는 추적기를 생성합니다.
    pub fn new(window: Duration) -> Self {
        Self {
            last_activity: None,
            window,
        }
    }

    /// 활동 시각을 기록합니다.
    pub fn record(&mut self, now: DateTime<Utc>) {
        self.last_activity = Some(now);
    }

    /// 마지막 활동 시각
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    /// 현재 서비스 상태를 계산합니다.
    ///
    /// - 로그 디렉토리가 없으면 `unknown` + 에러 메시지
    /// - 기록 없음 → `unknown`
    /// - 윈도우 이내 → `running`, 그 외 → `stopped`
    ///
    /// 기록이 있으면 `last_activity`는 항상 포함됩니다.
    pub fn status(&self, now: DateTime<Utc>, dir_exists: bool, log_dir: &Path) -> ServiceStatus {
        if !dir_exists {
            return ServiceStatus {
                mmdvm_host: ServiceState::Unknown,
                last_activity: self.last_activity,
                error_message: Some(format!("Log dir not found: {}", log_dir.display())),
            };
        }

        let state = match self.last_activity {
            None => ServiceState::Unknown,
            Some(last) => {
                // 시계가 뒤로 간 경우 경과 시간 0으로 취급
                let age = (now - last).to_std().unwrap_or(Duration::ZERO);
                if age < self.window {
                    ServiceState::Running
                } else {
                    ServiceState::Stopped
                }
            }
        };

        ServiceStatus {
            mmdvm_host: state,
            last_activity: self.last_activity,
            error_message: None,
        }
    }
}
