//! # hotspot-log-pipeline
//!
//! MMDVMHost 로그를 tail하여 음성 트래픽 이벤트를 추출하고,
//! 최근 이벤트 버퍼와 활동 기반 서비스 상태를 제공합니다.
//!
//! # 모듈 구성
//!
//! - [`collector`]: 일자별 로그 파일 감시 및 증분 읽기
//! - [`parser`]: 라인 엔벨로프 분리 및 DMR/D-Star/YSF/P25 매처
//! - [`buffer`]: 고정 용량 이벤트 버퍼 (가장 오래된 항목부터 제거)
//! - [`activity`]: 마지막 활동 시각 기반 서비스 상태 계산
//! - [`traffic`]: 버퍼와 활동 추적기를 묶은 공유 핸들
//! - [`pipeline`]: 수집 태스크 생명주기 (Pipeline trait 구현)
//! - [`config`]: 파이프라인 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! MMDVM-YYYY-MM-DD.log -> LogTail -> LineDecoder -> EventBuffer -> HTTP API
//!        (notify)          (offsets)   (matchers)    ActivityTracker
//! ```

pub mod activity;
pub mod buffer;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod traffic;

pub mod collector;
pub mod parser;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{LogPipeline, LogPipelineBuilder};

// 설정
pub use config::{PipelineConfig, PipelineConfigBuilder};

// 에러
pub use error::LogPipelineError;

// 파서
pub use parser::{DStarMatcher, DmrMatcher, LineDecoder, P25Matcher, YsfMatcher};

// 수집기
pub use collector::{CollectorStatus, LogTail};

// 버퍼 / 상태
pub use activity::ActivityTracker;
pub use buffer::EventBuffer;
pub use traffic::LiveTraffic;
