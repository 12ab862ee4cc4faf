//! System Fusion (YSF) 매처

use regex::Regex;

use hotspot_core::pipeline::{LineContext, LineMatcher, MatchOutcome};
use hotspot_core::types::{Mode, Origin, VoiceEvent};

use super::{case_insensitive, matched, parse_f64, parse_id, text};
use crate::error::LogPipelineError;

/// YSF 메시지 매처
///
/// 메시지에 `YSF` 리터럴이 없으면 정규식을 평가하지 않습니다.
pub struct YsfMatcher {
    header: Regex,
    end: Regex,
}

impl YsfMatcher {
    /// 정규식을 컴파일하여 매처를 생성합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        Ok(Self {
            header: case_insensitive(
                r"YSF, received (RF|network) (?:voice )?(?:header|transmission)(?: from ([0-9]+|[A-Z0-9]+))?(?: to ([0-9A-Za-z_]+))?",
            )?,
            end: case_insensitive(
                r"YSF, received (RF|network) end of voice transmission(?: from ([A-Z0-9]+))?,? ([0-9.]+) seconds",
            )?,
        })
    }
}

impl LineMatcher for YsfMatcher {
    fn name(&self) -> &str {
        "ysf"
    }

    fn match_message(&self, message: &str, line: &LineContext<'_>) -> MatchOutcome {
        if !message.contains("YSF") {
            return MatchOutcome::NoMatch;
        }

        if let Some(caps) = self.header.captures(message) {
            let origin = Origin::from_log_word(text(caps.get(1)));
            let source = text(caps.get(2));
            return matched(
                VoiceEvent::builder(line.timestamp, Mode::Ysf, origin, line.raw)
                    .callsign(source)
                    .src(parse_id(source))
                    .target(text(caps.get(3)))
                    .build(),
            );
        }

        if let Some(caps) = self.end.captures(message) {
            let origin = Origin::from_log_word(text(caps.get(1)));
            let source = text(caps.get(2));
            return matched(
                VoiceEvent::builder(line.timestamp, Mode::Ysf, origin, line.raw)
                    .callsign(source)
                    .src(parse_id(source))
                    .duration(parse_f64(caps.get(3)))
                    .build(),
            );
        }

        MatchOutcome::NoMatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn run(message: &str) -> Option<VoiceEvent> {
        let matcher = YsfMatcher::new().unwrap();
        let ctx = LineContext {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            raw: message,
        };
        matcher.match_message(message, &ctx).into_event()
    }

    #[test]
    fn network_header_with_callsign_and_target() {
        let event = run("YSF, received network voice header from K6JM to DG-ID 0").unwrap();
        assert_eq!(event.mode(), Mode::Ysf);
        assert_eq!(event.origin(), Origin::Network);
        assert_eq!(event.callsign(), "K6JM");
        assert_eq!(event.src(), None);
        assert_eq!(event.target(), "DG");
    }

    #[test]
    fn header_without_source_or_target() {
        let event = run("YSF, received RF header").unwrap();
        assert_eq!(event.origin(), Origin::Rf);
        assert_eq!(event.callsign(), "");
        assert_eq!(event.target(), "");
    }

    #[test]
    fn end_of_transmission_with_duration() {
        let event = run("YSF, received RF end of voice transmission from K6JM, 4.2 seconds").unwrap();
        assert_eq!(event.callsign(), "K6JM");
        assert_eq!(event.duration(), Some(4.2));
        assert_eq!(event.target(), "");
    }

    #[test]
    fn end_of_transmission_without_source() {
        let event = run("YSF, received network end of voice transmission, 12.5 seconds").unwrap();
        assert_eq!(event.origin(), Origin::Network);
        assert_eq!(event.callsign(), "");
        assert_eq!(event.duration(), Some(12.5));
    }

    #[test]
    fn lowercase_literal_fails_prefilter() {
        // 정규식은 대소문자 무관이지만 사전 필터는 "YSF" 리터럴을 요구함
        assert!(run("ysf, received RF header").is_none());
    }

    #[test]
    fn unrelated_message_is_no_match() {
        assert!(run("YSF, network watchdog has expired").is_none());
    }
}
