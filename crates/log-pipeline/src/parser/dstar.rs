//! D-Star 매처

use regex::Regex;

use hotspot_core::pipeline::{LineContext, LineMatcher, MatchOutcome};
use hotspot_core::types::{Mode, Origin, VoiceEvent};

use super::{case_insensitive, matched, text};
use crate::error::LogPipelineError;

/// D-Star 메시지 매처
///
/// 송신자 콜사인이 있는 음성 메시지를 먼저 시도하고,
/// 실패하면 리플렉터/대상만 있는 메시지를 네트워크 이벤트로 분류합니다.
pub struct DStarMatcher {
    voice: Regex,
    reflector: Regex,
}

impl DStarMatcher {
    /// 정규식을 컴파일하여 매처를 생성합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        Ok(Self {
            voice: case_insensitive(
                r"D-Star, received (RF|network) (?:end of )?voice transmission(?: header)? from ([A-Z0-9/]+)",
            )?,
            reflector: case_insensitive(
                r"D-Star, (?:received )?(?:RF|network) .* (?:to|reflector) ([0-9A-Za-z_]+)",
            )?,
        })
    }
}

impl LineMatcher for DStarMatcher {
    fn name(&self) -> &str {
        "dstar"
    }

    fn match_message(&self, message: &str, line: &LineContext<'_>) -> MatchOutcome {
        if let Some(caps) = self.voice.captures(message) {
            let origin = Origin::from_log_word(text(caps.get(1)));
            return matched(
                VoiceEvent::builder(line.timestamp, Mode::DStar, origin, line.raw)
                    .callsign(text(caps.get(2)))
                    .build(),
            );
        }

        if let Some(caps) = self.reflector.captures(message) {
            return matched(
                VoiceEvent::builder(line.timestamp, Mode::DStar, Origin::Network, line.raw)
                    .target(text(caps.get(1)))
                    .build(),
            );
        }

        MatchOutcome::NoMatch
    }
}
