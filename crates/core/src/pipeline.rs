//! 파이프라인 생명주기 trait와 로그 매처 확장 포인트
//!
//! - [`Pipeline`]: 백그라운드 작업의 시작/정지/상태 확인 생명주기
//! - [`LineMatcher`]: 프로토콜별 로그 메시지 분류기

use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};

use crate::error::HotspotError;
use crate::types::VoiceEvent;

/// 컴포넌트 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// 정상 동작
    Healthy,
    /// 동작은 하지만 기능 일부가 제한됨
    Degraded(String),
    /// 동작 불가
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, Self::Unhealthy(_))
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded(reason) => write!(f, "degraded: {reason}"),
            Self::Unhealthy(reason) => write!(f, "unhealthy: {reason}"),
        }
    }
}

/// 백그라운드 파이프라인 생명주기
///
/// ```text
/// Initialized → start() → Running → stop() → Stopped
/// ```
pub trait Pipeline: Send {
    /// 파이프라인을 시작합니다. 이미 실행 중이면 에러를 반환합니다.
    fn start(&mut self) -> impl Future<Output = Result<(), HotspotError>> + Send;

    /// 파이프라인을 정지하고 백그라운드 태스크 종료를 기다립니다.
    fn stop(&mut self) -> impl Future<Output = Result<(), HotspotError>> + Send;

    /// 현재 상태를 반환합니다.
    fn health_check(&self) -> impl Future<Output = HealthStatus> + Send;
}

/// 엔벨로프에서 분리된 라인 정보
///
/// 매처는 메시지 본문만 검사하고, 이벤트의 시각과 원본 라인은 여기서 가져옵니다.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    /// 로그 라인 타임스탬프 (UTC)
    pub timestamp: DateTime<Utc>,
    /// 원본 라인 전체
    pub raw: &'a str,
}

/// 매처 결과
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// 이벤트 생성됨
    Matched(VoiceEvent),
    /// 이 매처가 처리하지 않는 메시지
    NoMatch,
}

impl MatchOutcome {
    pub fn into_event(self) -> Option<VoiceEvent> {
        match self {
            Self::Matched(event) => Some(event),
            Self::NoMatch => None,
        }
    }
}

/// 프로토콜별 메시지 분류기
///
/// 새 프로토콜을 지원하려면 이 trait을 구현하고 디코더에 등록합니다.
/// 매칭 실패는 에러가 아니라 [`MatchOutcome::NoMatch`]입니다.
pub trait LineMatcher: Send + Sync {
    /// 매처 이름 (로그/메트릭용)
    fn name(&self) -> &str;

    /// 메시지 본문을 분류합니다.
    fn match_message(&self, message: &str, line: &LineContext<'_>) -> MatchOutcome;
}
