//! # hotspot-core
//!
//! MMDVM 핫스팟 대시보드의 공통 기반 크레이트입니다.
//!
//! - [`types`]: 음성 이벤트, 프로토콜, 서비스 상태 등 도메인 타입
//! - [`pipeline`]: 파이프라인 생명주기와 로그 매처 trait
//! - [`config`]: `hotspot.toml` 설정 로딩과 환경변수 오버라이드
//! - [`error`]: 에러 계층
//! - [`metrics`]: Prometheus 메트릭 이름

pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, HotspotError, PipelineError};

// 설정
pub use config::HotspotConfig;

// 파이프라인 trait
pub use pipeline::{HealthStatus, LineContext, LineMatcher, MatchOutcome, Pipeline};

// 도메인 타입
pub use types::{Mode, Origin, Rssi, ServiceState, ServiceStatus, Timeslot, VoiceEvent};
