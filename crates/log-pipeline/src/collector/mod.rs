//! 로그 수집 모듈 -- MMDVMHost 로그 디렉토리에서 새 라인을 수집합니다.
//!
//! # 수집 소스
//! - [`LogTail`]: 일자별 로그 파일 감시 (notify + 파일별 바이트 오프셋)
//!
//! # 아키텍처
//! notify 콜백 스레드가 변경된 파일 경로를 `tokio::mpsc` 채널로 보내고,
//! 단일 tokio 태스크가 경로를 순서대로 처리합니다.

pub mod file;

pub use file::LogTail;

use std::path::Path;

use chrono::NaiveDate;

/// 수집기 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorStatus {
    /// 실행 대기 중
    Idle,
    /// 실행 중
    Running,
    /// 에러로 중단됨
    Error(String),
    /// 정상 종료됨
    Stopped,
}

/// 일자별 로그 파일명 (`<prefix>-YYYY-MM-DD.log`)
pub fn log_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}.log", date.format("%Y-%m-%d"))
}

/// `<prefix>-*.log` 패턴에 맞는 파일인지 확인합니다.
pub fn is_log_file(prefix: &str, path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            name.len() > prefix.len() + ".log".len()
                && name.starts_with(prefix)
                && name[prefix.len()..].starts_with('-')
                && name.ends_with(".log")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(log_file_name("MMDVM", date), "MMDVM-2024-03-07.log");
    }

    #[test]
    fn is_log_file_matches_prefix_pattern() {
        assert!(is_log_file("MMDVM", Path::new("/var/log/pi-star/MMDVM-2024-03-07.log")));
        assert!(is_log_file("MMDVM", Path::new("MMDVM-x.log")));
        assert!(!is_log_file("MMDVM", Path::new("MMDVM.log")));
        assert!(!is_log_file("MMDVM", Path::new("MMDVM-.log")));
        assert!(!is_log_file("MMDVM", Path::new("DMRGateway-2024-03-07.log")));
        assert!(!is_log_file("MMDVM", Path::new("MMDVM-2024-03-07.log.1")));
        assert!(!is_log_file("MMDVM", Path::new("MMDVMHost-2024-03-07.log")));
    }
}
