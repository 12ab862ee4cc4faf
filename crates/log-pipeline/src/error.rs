//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 로그 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<LogPipelineError> for HotspotError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 라인 분류 실패나 엔벨로프 불일치는 에러가 아닙니다. 해당 라인은 건너뜁니다.

use hotspot_core::error::{HotspotError, PipelineError};

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 수집기 에러 (파일 I/O 등)
    #[error("collector error: {source_type}: {reason}")]
    Collector {
        /// 수집 소스 유형 (file 등)
        source_type: String,
        /// 에러 사유
        reason: String,
    },

    /// 디렉토리 감시 등록 실패
    #[error("watch error: {path}: {reason}")]
    Watch {
        /// 감시 대상 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<LogPipelineError> for HotspotError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::Io(e) => HotspotError::Io(e),
            LogPipelineError::Watch { .. } => {
                HotspotError::Pipeline(PipelineError::Watch(err.to_string()))
            }
            other => HotspotError::Pipeline(PipelineError::InitFailed(other.to_string())),
        }
    }
}
