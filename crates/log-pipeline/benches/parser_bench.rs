//! 라인 디코더 벤치마크
//!
//! 프로토콜별 매칭 비용과 비매칭 라인 처리량을 측정합니다.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use hotspot_log_pipeline::parser::LineDecoder;

const DMR_HEADER: &str =
    "M: 2024-01-15 12:00:00.123 DMR Slot 2, received network voice header from 3221205 to TG 91";

const DMR_RF_END: &str = "M: 2024-01-15 12:00:07.600 DMR Slot 2, received RF end of voice transmission from K6JM to 9990, 7.6 seconds, BER: 0.0%, RSSI: -43/-45/-47 dBm";

const DSTAR: &str =
    "M: 2024-01-15 12:00:00.000 D-Star, received network voice transmission from W1ABC   /ID51 to CQCQCQ";

const YSF: &str =
    "M: 2024-01-15 12:00:00.000 YSF, received network voice header from K6JM to DG-ID 0";

const P25: &str =
    "M: 2024-01-15 12:00:00.000 P25, received network transmission from 3221205 to 10200";

/// 매처까지 도달하지만 어떤 패턴과도 맞지 않는 라인
const UNMATCHED: &str =
    "M: 2024-01-15 12:00:00.000 DMR Slot 2, network watchdog has expired, 1.2 seconds, 0% packet loss";

/// 엔벨로프에서 걸러지는 라인
const NOISE: &str = "I: 2024-01-15 12:00:00.000 MMDVMHost-20230101 is running";

fn bench_modes(c: &mut Criterion) {
    let decoder = LineDecoder::with_defaults().unwrap();
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));

    for (name, line) in [
        ("dmr_header", DMR_HEADER),
        ("dmr_rf_end", DMR_RF_END),
        ("dstar", DSTAR),
        ("ysf", YSF),
        ("p25", P25),
        ("unmatched", UNMATCHED),
        ("noise", NOISE),
    ] {
        group.bench_function(name, |b| b.iter(|| decoder.decode(black_box(line))));
    }

    group.finish();
}

fn bench_mixed_log(c: &mut Criterion) {
    let decoder = LineDecoder::with_defaults().unwrap();
    let lines: Vec<&str> = [DMR_HEADER, NOISE, DMR_RF_END, DSTAR, NOISE, YSF, P25, UNMATCHED]
        .iter()
        .copied()
        .cycle()
        .take(1000)
        .collect();

    let mut group = c.benchmark_group("mixed_log");
    group.throughput(Throughput::Elements(lines.len() as u64));
    group.bench_function("decode_1000_lines", |b| {
        b.iter(|| {
            lines
                .iter()
                .filter_map(|line| decoder.decode(black_box(line)))
                .count()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_modes, bench_mixed_log);
criterion_main!(benches);
