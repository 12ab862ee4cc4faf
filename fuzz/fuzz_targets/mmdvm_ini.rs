#![no_main]

use hotspot_daemon::mmdvm_ini::IniDocument;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };

    // 임의 입력에서도 패닉 없이 파싱/직렬화되어야 한다
    let doc = IniDocument::parse(content);
    let _ = doc.to_json();
    let _ = doc.to_ini_string();
});
