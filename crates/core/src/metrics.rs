//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `hotspot_`
//! - 모듈명: `log_pipeline_`, `http_`, `wpsd_`, `daemon_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(hotspot_core::metrics::LOG_PIPELINE_EVENTS_DECODED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 프로토콜 레이블 키 (DMR, D-Star, YSF, P25)
pub const LABEL_MODE: &str = "mode";

/// HTTP 라우트 레이블 키
pub const LABEL_ROUTE: &str = "route";

/// HTTP 상태 코드 레이블 키
pub const LABEL_STATUS: &str = "status";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Log Pipeline 메트릭 ────────────────────────────────────────────

/// Log Pipeline: 읽은 로그 라인 수 (counter)
pub const LOG_PIPELINE_LINES_READ_TOTAL: &str = "hotspot_log_pipeline_lines_read_total";

/// Log Pipeline: 디코딩된 음성 이벤트 수 (counter, label: mode)
pub const LOG_PIPELINE_EVENTS_DECODED_TOTAL: &str = "hotspot_log_pipeline_events_decoded_total";

/// Log Pipeline: 분류되지 않은 라인 수 (counter)
pub const LOG_PIPELINE_LINES_UNMATCHED_TOTAL: &str = "hotspot_log_pipeline_lines_unmatched_total";

/// Log Pipeline: 파일 읽기 실패 수 (counter)
pub const LOG_PIPELINE_READ_ERRORS_TOTAL: &str = "hotspot_log_pipeline_read_errors_total";

/// Log Pipeline: 버퍼 내 이벤트 수 (gauge)
pub const LOG_PIPELINE_BUFFER_SIZE: &str = "hotspot_log_pipeline_buffer_size";

/// Log Pipeline: 용량 초과로 제거된 이벤트 수 (counter)
pub const LOG_PIPELINE_BUFFER_EVICTIONS_TOTAL: &str =
    "hotspot_log_pipeline_buffer_evictions_total";

// ─── HTTP 메트릭 ────────────────────────────────────────────────────

/// HTTP: 처리된 요청 수 (counter, labels: route, status)
pub const HTTP_REQUESTS_TOTAL: &str = "hotspot_http_requests_total";

/// HTTP: 요청 처리 시간 (histogram, 초)
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "hotspot_http_request_duration_seconds";

// ─── WPSD 프록시 메트릭 ─────────────────────────────────────────────

/// WPSD: 업스트림 호출 실패 수 (counter)
pub const WPSD_UPSTREAM_FAILURES_TOTAL: &str = "hotspot_wpsd_upstream_failures_total";

// ─── Daemon 메트릭 ──────────────────────────────────────────────────

/// Daemon: 빌드 정보 (gauge, 항상 1, labels: version)
pub const DAEMON_BUILD_INFO: &str = "hotspot_daemon_build_info";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// HTTP 요청 처리 시간 히스토그램 버킷 (초)
///
/// 1ms ~ 15s 범위 (업스트림 프록시 타임아웃 포함)
pub const HTTP_DURATION_BUCKETS: [f64; 9] = [0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 이 함수는 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `hotspot-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Log Pipeline
    describe_counter!(
        LOG_PIPELINE_LINES_READ_TOTAL,
        "Total number of log lines read from MMDVMHost log files"
    );
    describe_counter!(
        LOG_PIPELINE_EVENTS_DECODED_TOTAL,
        "Total number of voice events decoded, by mode"
    );
    describe_counter!(
        LOG_PIPELINE_LINES_UNMATCHED_TOTAL,
        "Total number of log lines that no protocol matcher recognized"
    );
    describe_counter!(
        LOG_PIPELINE_READ_ERRORS_TOTAL,
        "Total number of log file read failures"
    );
    describe_gauge!(
        LOG_PIPELINE_BUFFER_SIZE,
        "Current number of voice events in the recent-event buffer"
    );
    describe_counter!(
        LOG_PIPELINE_BUFFER_EVICTIONS_TOTAL,
        "Total number of voice events evicted due to buffer capacity"
    );

    // HTTP
    describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP API requests");
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "HTTP API request handling time in seconds"
    );

    // WPSD
    describe_counter!(
        WPSD_UPSTREAM_FAILURES_TOTAL,
        "Total number of failed calls to the hotspot admin web service"
    );

    // Daemon
    describe_gauge!(
        DAEMON_BUILD_INFO,
        "Build information (always 1, with version label)"
    );
}
