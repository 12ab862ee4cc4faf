//! P25 Phase 1 매처

use regex::Regex;

use hotspot_core::pipeline::{LineContext, LineMatcher, MatchOutcome};
use hotspot_core::types::{Mode, Origin, VoiceEvent};

use super::{case_insensitive, matched, parse_f64, parse_id, text};
use crate::error::LogPipelineError;

/// P25 메시지 매처
///
/// 메시지에 `P25` 리터럴이 없으면 정규식을 평가하지 않습니다.
/// 송신자와 대상은 숫자 ID이며, 숫자 대상은 `targetId`에도 기록됩니다.
pub struct P25Matcher {
    header: Regex,
    end: Regex,
}

impl P25Matcher {
    /// 정규식을 컴파일하여 매처를 생성합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        Ok(Self {
            header: case_insensitive(
                r"P25, received (RF|network) (?:voice )?(?:header|transmission)(?: from ([0-9]+))?(?: to ([0-9]+))?",
            )?,
            end: case_insensitive(
                r"P25, received (RF|network) end of voice transmission(?: from ([0-9]+))?,? ([0-9.]+) seconds",
            )?,
        })
    }
}

impl LineMatcher for P25Matcher {
    fn name(&self) -> &str {
        "p25"
    }

    fn match_message(&self, message: &str, line: &LineContext<'_>) -> MatchOutcome {
        if !message.contains("P25") {
            return MatchOutcome::NoMatch;
        }

        if let Some(caps) = self.header.captures(message) {
            let origin = Origin::from_log_word(text(caps.get(1)));
            let source = text(caps.get(2));
            let target = text(caps.get(3));
            return matched(
                VoiceEvent::builder(line.timestamp, Mode::P25, origin, line.raw)
                    .callsign(source)
                    .src(parse_id(source))
                    .target(target)
                    .target_id(parse_id(target))
                    .build(),
            );
        }

        if let Some(caps) = self.end.captures(message) {
            let origin = Origin::from_log_word(text(caps.get(1)));
            let source = text(caps.get(2));
            return matched(
                VoiceEvent::builder(line.timestamp, Mode::P25, origin, line.raw)
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
        let matcher = P25Matcher::new().unwrap();
        let ctx = LineContext {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            raw: message,
        };
        matcher.match_message(message, &ctx).into_event()
    }

    #[test]
    fn network_transmission_with_ids() {
        let event = run("P25, received network transmission from 3221205 to 10200").unwrap();
        assert_eq!(event.mode(), Mode::P25);
        assert_eq!(event.origin(), Origin::Network);
        assert_eq!(event.callsign(), "3221205");
        assert_eq!(event.src(), Some(3221205));
        assert_eq!(event.target(), "10200");
        assert_eq!(event.target_id(), Some(10200));
    }

    #[test]
    fn rf_voice_header_without_ids() {
        let event = run("P25, received RF voice header").unwrap();
        assert_eq!(event.origin(), Origin::Rf);
        assert_eq!(event.callsign(), "");
        assert_eq!(event.src(), None);
        assert_eq!(event.target_id(), None);
    }

    #[test]
    fn end_of_transmission_with_duration() {
        let event =
            run("P25, received RF end of voice transmission from 3221205, 2.4 seconds").unwrap();
        assert_eq!(event.origin(), Origin::Rf);
        assert_eq!(event.src(), Some(3221205));
        assert_eq!(event.duration(), Some(2.4));
        assert_eq!(event.ber(), None);
    }

    #[test]
    fn unrelated_message_is_no_match() {
        assert!(run("P25, network watchdog has expired").is_none());
        assert!(run("DMR Slot 2, received RF voice header from K6JM to 9990").is_none());
    }
}
