//! 로그 파싱 모듈 -- MMDVMHost 로그 라인을 음성 이벤트로 분류
//!
//! [`LineDecoder`]는 `M: <timestamp> <message>` 엔벨로프를 분리한 뒤,
//! 등록된 프로토콜 매처를 순서대로 시도합니다.
//! 각 매처는 core의 [`LineMatcher`](hotspot_core::pipeline::LineMatcher) trait을 구현합니다.
//!
//! # 지원 프로토콜 (우선순위 순)
//! - DMR ([`DmrMatcher`])
//! - D-Star ([`DStarMatcher`])
//! - System Fusion ([`YsfMatcher`])
//! - P25 ([`P25Matcher`])
//!
//! # 사용 예시
//! ```ignore
//! use hotspot_log_pipeline::parser::LineDecoder;
//!
//! let decoder = LineDecoder::with_defaults()?;
//! let event = decoder.decode(
//!     "M: 2024-01-01 12:00:00.000 DMR Slot 2, received network voice header from 2501001 to TG 2501",
//! );
//! ```

pub mod dmr;
pub mod dstar;
pub mod p25;
pub mod ysf;

pub use dmr::DmrMatcher;
pub use dstar::DStarMatcher;
pub use p25::P25Matcher;
pub use ysf::YsfMatcher;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::{Regex, RegexBuilder};

use hotspot_core::pipeline::{LineContext, LineMatcher, MatchOutcome};
use hotspot_core::types::VoiceEvent;

use crate::error::LogPipelineError;

/// MMDVMHost 메시지 라인 엔벨로프
const ENVELOPE_PATTERN: &str =
    r"^M:\s+([0-9]{4}-[0-9]{2}-[0-9]{2}\s+[0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3})\s+(.+)$";

/// 라인 디코더 -- 엔벨로프 분리 후 프로토콜 매처를 우선순위대로 시도합니다.
///
/// 첫 번째로 매칭된 매처의 이벤트를 반환합니다.
/// 엔벨로프가 맞지 않거나 어떤 매처도 매칭하지 않으면 `None`입니다 (에러 아님).
pub struct LineDecoder {
    envelope: Regex,
    /// 등록된 매처 목록 (순서대로 시도)
    matchers: Vec<Box<dyn LineMatcher>>,
}

impl LineDecoder {
    /// 매처 없이 디코더를 생성합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        Ok(Self {
            envelope: Regex::new(ENVELOPE_PATTERN)?,
            matchers: Vec::new(),
        })
    }

    /// 기본 매처 세트 (DMR → D-Star → YSF → P25)로 디코더를 생성합니다.
    pub fn with_defaults() -> Result<Self, LogPipelineError> {
        Ok(Self::new()?
            .register(Box::new(DmrMatcher::new()?))
            .register(Box::new(DStarMatcher::new()?))
            .register(Box::new(YsfMatcher::new()?))
            .register(Box::new(P25Matcher::new()?)))
    }

    /// 매처를 등록합니다. 등록 순서대로 시도됩니다.
    pub fn register(mut self, matcher: Box<dyn LineMatcher>) -> Self {
        self.matchers.push(matcher);
        self
    }

    /// 로그 라인 하나를 디코딩합니다.
    ///
    /// 끝의 `\r`/`\n`은 무시합니다.
    pub fn decode(&self, line: &str) -> Option<VoiceEvent> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (timestamp, message) = self.split_envelope(line)?;
        let ctx = LineContext {
            timestamp,
            raw: line,
        };

        self.matchers
            .iter()
            .find_map(|m| m.match_message(message, &ctx).into_event())
    }

    /// 엔벨로프에서 타임스탬프(UTC)와 메시지 본문을 분리합니다.
    ///
    /// 날짜가 존재하지 않는 값(예: 13월)이면 `None`입니다.
    pub fn split_envelope<'a>(&self, line: &'a str) -> Option<(DateTime<Utc>, &'a str)> {
        let caps = self.envelope.captures(line)?;
        let ts = caps.get(1)?.as_str();
        let message = caps.get(2)?.as_str();
        Some((parse_log_timestamp(ts)?, message))
    }

    /// 등록된 매처 이름 목록을 반환합니다.
    pub fn registered_matchers(&self) -> Vec<&str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }
}

/// `YYYY-MM-DD HH:MM:SS.mmm` (공백 개수 무관)를 UTC 시각으로 해석합니다.
fn parse_log_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    let mut parts = ts.split_whitespace();
    let date = parts.next()?;
    let time = parts.next()?;
    let normalized = format!("{date} {time}");
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.3f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// 대소문자를 구분하지 않는 정규식을 컴파일합니다.
pub(crate) fn case_insensitive(pattern: &str) -> Result<Regex, LogPipelineError> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

/// 숫자 ID 파싱. u32 범위를 벗어나거나 숫자가 아니면 `None`입니다.
pub(crate) fn parse_id(s: &str) -> Option<u32> {
    s.parse::<u32>().ok()
}

/// 캡처 그룹이 존재하고 실수로 해석될 때만 값을 반환합니다.
pub(crate) fn parse_f64(s: Option<regex::Match<'_>>) -> Option<f64> {
    s.and_then(|m| m.as_str().parse::<f64>().ok())
}

/// 캡처 그룹 텍스트 (없으면 빈 문자열)
pub(crate) fn text<'h>(m: Option<regex::Match<'h>>) -> &'h str {
    m.map_or("", |m| m.as_str())
}

pub(crate) fn matched(event: VoiceEvent) -> MatchOutcome {
    MatchOutcome::Matched(event)
}
