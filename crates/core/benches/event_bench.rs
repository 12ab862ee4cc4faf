//! 음성 이벤트 벤치마크
//!
//! VoiceEvent 생성과 JSON 직렬화 성능을 측정합니다.
//! live-traffic 응답은 최대 100개 이벤트를 한 번에 직렬화합니다.

use chrono::{TimeZone, Utc};
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use hotspot_core::types::{Mode, Origin, Rssi, Timeslot, VoiceEvent};

const RAW: &str = "M: 2024-01-01 12:00:00.000 DMR Slot 2, received RF end of voice transmission from K6JM to 9990, 7.6 seconds, BER: 0.0%, RSSI: -43/-43/-43 dBm";

fn create_event() -> VoiceEvent {
    let ts = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    VoiceEvent::builder(ts, Mode::Dmr, Origin::Rf, RAW)
        .callsign("K6JM")
        .target("9990")
        .target_id(Some(9990))
        .timeslot(Timeslot::Two)
        .duration(Some(7.6))
        .ber(Some(0.0))
        .rssi(Rssi::from_samples(&[-43, -43, -43]))
        .build()
}

fn bench_event_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_creation");
    group.throughput(Throughput::Elements(1));

    group.bench_function("builder_full", |b| b.iter(|| black_box(create_event())));

    group.bench_function("rssi_from_samples", |b| {
        b.iter(|| Rssi::from_samples(black_box(&[-40, -50, -60])))
    });

    group.finish();
}

fn bench_event_serialization(c: &mut Criterion) {
    let event = create_event();
    let batch: Vec<VoiceEvent> = (0..100).map(|_| create_event()).collect();

    let mut group = c.benchmark_group("event_serialization");

    group.throughput(Throughput::Elements(1));
    group.bench_function("event_to_json", |b| {
        b.iter(|| serde_json::to_string(black_box(&event)).unwrap())
    });

    group.throughput(Throughput::Elements(batch.len() as u64));
    group.bench_function("batch_100_to_json", |b| {
        b.iter(|| serde_json::to_vec(black_box(&batch)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_event_creation, bench_event_serialization);
criterion_main!(benches);
