//! 라이브 트래픽 핸들 -- 버퍼와 활동 추적기를 공유하는 읽기/쓰기 창구
//!
//! [`LiveTraffic`]은 `Arc`로 감싼 공유 상태이며 복제 비용이 낮습니다.
//! 수집 태스크가 유일한 쓰기 주체이고, HTTP 핸들러는 읽기만 합니다.
//!
//! # 동시성
//! - 버퍼: `Mutex` 하나로 push와 eviction을 원자적으로 처리
//! - 활동 시각: 별도 `RwLock`
//! - 조회 결과는 항상 복사본이므로 호출자가 공유 상태를 변경할 수 없음

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};

use hotspot_core::metrics as m;
use hotspot_core::types::{ServiceStatus, VoiceEvent};

use crate::activity::ActivityTracker;
use crate::buffer::EventBuffer;
use crate::config::PipelineConfig;

struct Shared {
    buffer: Mutex<EventBuffer>,
    activity: RwLock<ActivityTracker>,
    log_dir: PathBuf,
}

/// 최근 음성 이벤트와 서비스 상태에 대한 공유 핸들
#[derive(Clone)]
pub struct LiveTraffic {
    shared: Arc<Shared>,
}

impl LiveTraffic {
    /// 설정에 맞는 빈 버퍼와 추적기로 핸들을 생성합니다.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                buffer: Mutex::new(EventBuffer::new(config.buffer_capacity, config.max_recent)),
                activity: RwLock::new(ActivityTracker::new(config.activity_window())),
                log_dir: config.log_dir.clone(),
            }),
        }
    }

    /// 디코딩된 이벤트를 파일 순서대로 버퍼에 추가하고 활동 시각을 갱신합니다.
    ///
    /// 추가된 이벤트 수를 반환합니다.
    pub fn ingest(&self, events: Vec<VoiceEvent>) -> usize {
        self.ingest_at(events, Utc::now())
    }

    /// [`ingest`](Self::ingest)와 같지만 활동 시각을 지정합니다.
    pub fn ingest_at(&self, events: Vec<VoiceEvent>, now: DateTime<Utc>) -> usize {
        let count = events.len();
        if count == 0 {
            return 0;
        }

        let (evicted, len) = {
            let mut buffer = self
                .shared
                .buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let mut evicted = 0u64;
            for event in events {
                counter!(m::LOG_PIPELINE_EVENTS_DECODED_TOTAL, m::LABEL_MODE => event.mode().as_str())
                    .increment(1);
                if buffer.push(event) {
                    evicted += 1;
                }
            }
            (evicted, buffer.len())
        };

        self.shared
            .activity
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .record(now);

        if evicted > 0 {
            counter!(m::LOG_PIPELINE_BUFFER_EVICTIONS_TOTAL).increment(evicted);
        }
        gauge!(m::LOG_PIPELINE_BUFFER_SIZE).set(len as f64);

        count
    }

    /// 최신 이벤트를 최신순으로 반환합니다.
    pub fn recent(&self, limit: usize) -> Vec<VoiceEvent> {
        self.shared
            .buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recent(limit)
    }

    /// 현재 서비스 상태를 반환합니다.
    ///
    /// 로그 디렉토리 존재 여부는 호출 시점에 확인합니다.
    pub fn status(&self) -> ServiceStatus {
        self.status_at(Utc::now())
    }

    /// 지정 시각 기준의 서비스 상태를 반환합니다.
    pub fn status_at(&self, now: DateTime<Utc>) -> ServiceStatus {
        let tracker = self
            .shared
            .activity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        tracker.status(now, self.shared.log_dir.is_dir(), &self.shared.log_dir)
    }

    /// 버퍼에 저장된 이벤트 수
    pub fn len(&self) -> usize {
        self.shared
            .buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// 버퍼가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 감시 대상 로그 디렉토리
    pub fn log_dir(&self) -> &Path {
        &self.shared.log_dir
    }
}
