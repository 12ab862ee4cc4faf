#![no_main]

use arbitrary::Arbitrary;
use hotspot_core::types::Rssi;
use hotspot_log_pipeline::LineDecoder;
use libfuzzer_sys::fuzz_target;

/// 실제 로그 형식에 가까운 라인을 만들어 매처 깊숙이 도달시키기 위한 입력
#[derive(Arbitrary, Debug)]
struct FuzzLine {
    mode: FuzzMode,
    network: bool,
    end: bool,
    slot: u8,
    callsign: String,
    target: String,
    duration: String,
    quality: String,
    rssi: (i16, i16, i16),
}

#[derive(Arbitrary, Debug)]
enum FuzzMode {
    Dmr,
    DStar,
    Ysf,
    P25,
}

impl FuzzLine {
    fn render(&self) -> String {
        let origin = if self.network { "network" } else { "RF" };
        let envelope = "M: 2024-01-01 12:00:00.000";
        let body = match (&self.mode, self.end) {
            (FuzzMode::Dmr, false) => format!(
                "DMR Slot {}, received {origin} voice header from {} to {}",
                self.slot, self.callsign, self.target
            ),
            (FuzzMode::Dmr, true) => format!(
                "DMR Slot {}, received {origin} end of voice transmission from {} to {}, {} seconds, {}, RSSI: {}/{}/{} dBm",
                self.slot,
                self.callsign,
                self.target,
                self.duration,
                self.quality,
                self.rssi.0,
                self.rssi.1,
                self.rssi.2
            ),
            (FuzzMode::DStar, false) => format!(
                "D-Star, received {origin} header from {} to {}",
                self.callsign, self.target
            ),
            (FuzzMode::DStar, true) => format!(
                "D-Star, received {origin} end of transmission from {} to {}, {} seconds, {}",
                self.callsign, self.target, self.duration, self.quality
            ),
            (FuzzMode::Ysf, false) => format!(
                "YSF, received {origin} data from {} to {}",
                self.callsign, self.target
            ),
            (FuzzMode::Ysf, true) => format!(
                "YSF, received {origin} end of transmission from {} to {}, {} seconds, {}",
                self.callsign, self.target, self.duration, self.quality
            ),
            (FuzzMode::P25, false) => format!(
                "P25, received {origin} transmission from {} to {}",
                self.callsign, self.target
            ),
            (FuzzMode::P25, true) => format!(
                "P25, received {origin} end of voice transmission from {} to {}, {} seconds, {}",
                self.callsign, self.target, self.duration, self.quality
            ),
        };
        format!("{envelope} {body}")
    }
}

fuzz_target!(|input: FuzzLine| {
    let Ok(decoder) = LineDecoder::with_defaults() else {
        return;
    };
    let line = input.render();
    if let Some(event) = decoder.decode(&line) {
        if let Some(Rssi::Range { min, avg, max }) = event.rssi() {
            assert!(min <= avg && avg <= max);
        }
        if let Some(duration) = event.duration() {
            assert!(duration >= 0.0);
        }
    }
});
