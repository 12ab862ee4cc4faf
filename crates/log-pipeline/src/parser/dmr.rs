//! DMR 매처
//!
//! MMDVMHost가 기록하는 DMR 슬롯 메시지를 분류합니다.
//!
//! ```text
//! DMR Slot 2, received network voice header from 2501001 to TG 2501
//! DMR Slot 2, received network end of voice transmission, 6.2 seconds, 5% packet loss, BER: 0.0%
//! DMR Slot 2, received RF end of voice transmission from K6JM to 9990, 7.6 seconds, BER: 0.0%, RSSI: -43/-43/-43 dBm
//! DMR Slot 2, received network end of voice transmission from 2501001 to TG 2501, 3.1 seconds
//! ```

use regex::Regex;

use hotspot_core::pipeline::{LineContext, LineMatcher, MatchOutcome};
use hotspot_core::types::{Mode, Origin, Rssi, Timeslot, VoiceEvent};

use super::{case_insensitive, matched, parse_f64, parse_id, text};
use crate::error::LogPipelineError;

/// DMR 슬롯 메시지 매처
///
/// 하위 패턴을 헤더 → 네트워크 종료(품질) → RF 종료(품질) → 네트워크 종료(송신자)
/// 순서로 시도합니다.
pub struct DmrMatcher {
    header: Regex,
    network_end: Regex,
    rf_end: Regex,
    network_end_from: Regex,
}

impl DmrMatcher {
    /// 정규식을 컴파일하여 매처를 생성합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        Ok(Self {
            header: case_insensitive(
                r"DMR Slot ([0-9]), received (RF|network) voice header from ([0-9]+|[A-Z0-9/]+) to (?:TG )?([0-9]+)",
            )?,
            network_end: case_insensitive(
                r"DMR Slot ([0-9]), received network end of voice transmission, ([0-9.]+) seconds, ([0-9]+)% packet loss, BER: ([0-9.]+)%",
            )?,
            rf_end: case_insensitive(
                r"DMR Slot ([0-9]), received RF end of voice transmission from ([A-Z0-9]+) to ([0-9]+), ([0-9.]+) seconds, BER: ([0-9.]+)%, RSSI: (-?[0-9]+)(?:/(-?[0-9]+))?(?:/(-?[0-9]+))? dBm",
            )?,
            network_end_from: case_insensitive(
                r"DMR Slot ([0-9]), received network end of voice transmission from ([0-9]+) to TG ([0-9]+), ([0-9.]+) seconds",
            )?,
        })
    }

    fn match_header(&self, message: &str, line: &LineContext<'_>) -> Option<VoiceEvent> {
        let caps = self.header.captures(message)?;
        let slot = Timeslot::from_log_digit(text(caps.get(1)));
        let origin = Origin::from_log_word(text(caps.get(2)));
        let source = text(caps.get(3));
        let target = text(caps.get(4));

        Some(
            VoiceEvent::builder(line.timestamp, Mode::Dmr, origin, line.raw)
                .timeslot(slot)
                .callsign(source)
                .src(parse_id(source))
                .target(format!("TG {target}"))
                .target_id(parse_id(target))
                .build(),
        )
    }

    fn match_network_end(&self, message: &str, line: &LineContext<'_>) -> Option<VoiceEvent> {
        let caps = self.network_end.captures(message)?;
        let slot = Timeslot::from_log_digit(text(caps.get(1)));

        // 네트워크 이벤트의 BER은 builder에서 제거됨
        Some(
            VoiceEvent::builder(line.timestamp, Mode::Dmr, Origin::Network, line.raw)
                .timeslot(slot)
                .duration(parse_f64(caps.get(2)))
                .loss(parse_f64(caps.get(3)))
                .ber(parse_f64(caps.get(4)))
                .build(),
        )
    }

    fn match_rf_end(&self, message: &str, line: &LineContext<'_>) -> Option<VoiceEvent> {
        let caps = self.rf_end.captures(message)?;
        let slot = Timeslot::from_log_digit(text(caps.get(1)));
        let target = text(caps.get(3));

        let samples: Vec<i32> = [caps.get(6), caps.get(7), caps.get(8)]
            .into_iter()
            .flatten()
            .filter_map(|m| m.as_str().parse::<i32>().ok())
            .collect();

        Some(
            VoiceEvent::builder(line.timestamp, Mode::Dmr, Origin::Rf, line.raw)
                .timeslot(slot)
                .callsign(text(caps.get(2)))
                .target(target)
                .target_id(parse_id(target))
                .duration(parse_f64(caps.get(4)))
                .ber(parse_f64(caps.get(5)))
                .rssi(Rssi::from_samples(&samples))
                .build(),
        )
    }

    fn match_network_end_from(&self, message: &str, line: &LineContext<'_>) -> Option<VoiceEvent> {
        let caps = self.network_end_from.captures(message)?;
        let slot = Timeslot::from_log_digit(text(caps.get(1)));
        let source = text(caps.get(2));
        let target = text(caps.get(3));

        Some(
            VoiceEvent::builder(line.timestamp, Mode::Dmr, Origin::Network, line.raw)
                .timeslot(slot)
                .callsign(source)
                .src(parse_id(source))
                .target(format!("TG {target}"))
                .target_id(parse_id(target))
                .duration(parse_f64(caps.get(4)))
                .build(),
        )
    }
}

impl LineMatcher for DmrMatcher {
    fn name(&self) -> &str {
        "dmr"
    }

    fn match_message(&self, message: &str, line: &LineContext<'_>) -> MatchOutcome {
        self.match_header(message, line)
            .or_else(|| self.match_network_end(message, line))
            .or_else(|| self.match_rf_end(message, line))
            .or_else(|| self.match_network_end_from(message, line))
            .map_or(MatchOutcome::NoMatch, matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn run(message: &str) -> Option<VoiceEvent> {
        let matcher = DmrMatcher::new().unwrap();
        let ctx = LineContext {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            raw: message,
        };
        matcher.match_message(message, &ctx).into_event()
    }

    #[test]
    fn network_voice_header_with_numeric_source() {
        let event =
            run("DMR Slot 2, received network voice header from 2501001 to TG 2501").unwrap();
        assert_eq!(event.origin(), Origin::Network);
        assert_eq!(event.timeslot(), Some(Timeslot::Two));
        assert_eq!(event.src(), Some(2501001));
        assert_eq!(event.callsign(), "2501001");
        assert_eq!(event.target(), "TG 2501");
        assert_eq!(event.target_id(), Some(2501));
    }

    #[test]
    fn rf_voice_header_with_callsign_source() {
        let event = run("DMR Slot 1, received RF voice header from K6JM to 9990").unwrap();
        assert_eq!(event.origin(), Origin::Rf);
        assert_eq!(event.timeslot(), Some(Timeslot::One));
        assert_eq!(event.src(), None);
        assert_eq!(event.callsign(), "K6JM");
        assert_eq!(event.target(), "TG 9990");
    }

    #[test]
    fn header_source_out_of_range_keeps_text_only() {
        let event = run("DMR Slot 2, received network voice header from 99999999999 to TG 91").unwrap();
        assert_eq!(event.src(), None);
        assert_eq!(event.callsign(), "99999999999");
    }

    #[test]
    fn network_end_with_quality_drops_ber() {
        let event = run(
            "DMR Slot 2, received network end of voice transmission, 6.2 seconds, 5% packet loss, BER: 0.3%",
        )
        .unwrap();
        assert_eq!(event.origin(), Origin::Network);
        assert_eq!(event.duration(), Some(6.2));
        assert_eq!(event.loss(), Some(5.0));
        assert_eq!(event.ber(), None);
        assert_eq!(event.callsign(), "");
        assert_eq!(event.target(), "");
    }

    #[test]
    fn rf_end_with_three_rssi_samples() {
        let event = run(
            "DMR Slot 2, received RF end of voice transmission from K6JM to 9990, 7.6 seconds, BER: 1.2%, RSSI: -40/-50/-60 dBm",
        )
        .unwrap();
        assert_eq!(
            event.rssi(),
            Some(Rssi::Range {
                min: -60,
                avg: -50,
                max: -40
            })
        );
        assert_eq!(event.ber(), Some(1.2));
        assert_eq!(event.loss(), None);
    }

    #[test]
    fn rf_end_with_single_rssi_sample() {
        let event = run(
            "DMR Slot 1, received RF end of voice transmission from K6JM to 9990, 1.0 seconds, BER: 0.0%, RSSI: -47 dBm",
        )
        .unwrap();
        assert_eq!(event.rssi(), Some(Rssi::Single(-47)));
    }

    #[test]
    fn rf_end_with_two_rssi_samples_reports_first() {
        let event = run(
            "DMR Slot 1, received RF end of voice transmission from K6JM to 9990, 1.0 seconds, BER: 0.0%, RSSI: -47/-51 dBm",
        )
        .unwrap();
        assert_eq!(event.rssi(), Some(Rssi::Single(-47)));
    }

    #[test]
    fn network_end_with_source() {
        let event = run(
            "DMR Slot 2, received network end of voice transmission from 3221205 to TG 31665, 3.1 seconds",
        )
        .unwrap();
        assert_eq!(event.origin(), Origin::Network);
        assert_eq!(event.src(), Some(3221205));
        assert_eq!(event.callsign(), "3221205");
        assert_eq!(event.target(), "TG 31665");
        assert_eq!(event.target_id(), Some(31665));
        assert_eq!(event.duration(), Some(3.1));
    }

    #[test]
    fn case_insensitive_match() {
        let event = run("dmr slot 2, RECEIVED rf VOICE HEADER from k6jm to tg 91").unwrap();
        assert_eq!(event.origin(), Origin::Rf);
        assert_eq!(event.callsign(), "k6jm");
    }

    #[test]
    fn other_slot_digit_maps_to_ts2() {
        let event = run("DMR Slot 3, received network voice header from 1 to TG 2").unwrap();
        assert_eq!(event.timeslot(), Some(Timeslot::Two));
    }

    #[test]
    fn unrelated_dmr_message_is_no_match() {
        assert!(run("DMR Slot 2, RF user 3221205 rejected").is_none());
        assert!(run("D-Star, received RF voice header from K6JM").is_none());
    }
}
