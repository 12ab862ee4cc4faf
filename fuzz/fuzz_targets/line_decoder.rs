#![no_main]

use hotspot_log_pipeline::LineDecoder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(decoder) = LineDecoder::with_defaults() else {
        return;
    };

    // 임의 입력에서도 패닉 없이 Some 또는 None을 반환해야 한다
    let line = String::from_utf8_lossy(data);
    if let Some(event) = decoder.decode(&line) {
        assert_eq!(event.raw(), line.as_ref());
        assert!(event.ber().is_none() || event.loss().is_none());
    }
});
