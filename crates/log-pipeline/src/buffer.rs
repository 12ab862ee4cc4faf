//! 이벤트 버퍼 -- 최근 음성 이벤트의 고정 용량 보관소
//!
//! [`EventBuffer`]는 디코딩된 이벤트를 수집 순서대로 보관합니다.
//! 용량을 넘으면 가장 오래된 이벤트부터 제거합니다 (FIFO).
//! 프로세스 재시작 시 내용은 사라집니다.

use std::collections::VecDeque;

use hotspot_core::types::VoiceEvent;

/// 고정 용량 최근 이벤트 버퍼
///
/// # 불변 조건
/// - `len() <= capacity()`
/// - 내부 순서는 push 순서 (오래된 것이 앞)
pub struct EventBuffer {
    /// 버퍼 내부 저장소
    buffer: VecDeque<VoiceEvent>,
    /// 최대 용량
    capacity: usize,
    /// `recent()` 한 번에 반환하는 최대 개수
    max_recent: usize,
    /// 용량 초과로 제거된 이벤트 수 (통계용)
    evicted_count: u64,
    /// 총 유입 이벤트 수
    total_received: u64,
}

impl EventBuffer {
    /// 새 이벤트 버퍼를 생성합니다.
    ///
    /// `capacity`와 `max_recent`는 최소 1로 보정됩니다.
    pub fn new(capacity: usize, max_recent: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity.min(10_000)),
            capacity,
            max_recent: max_recent.max(1),
            evicted_count: 0,
            total_received: 0,
        }
    }

    /// 이벤트를 추가합니다.
    ///
    /// 용량을 넘으면 가장 오래된 이벤트를 제거하고 `true`를 반환합니다.
    pub fn push(&mut self, event: VoiceEvent) -> bool {
        self.total_received += 1;
        self.buffer.push_back(event);

        if self.buffer.len() > self.capacity {
            self.buffer.pop_front();
            self.evicted_count += 1;
            tracing::trace!(
                evicted = self.evicted_count,
                capacity = self.capacity,
                "buffer full, evicted oldest event"
            );
            return true;
        }
        false
    }

    /// 최신 이벤트를 최신순으로 반환합니다.
    ///
    /// `limit`은 `[1, max_recent]` 범위로 보정되며, 버퍼에 있는 것보다
    /// 많이 요청하면 있는 만큼만 반환합니다.
    pub fn recent(&self, limit: usize) -> Vec<VoiceEvent> {
        let limit = limit.clamp(1, self.max_recent);
        self.buffer.iter().rev().take(limit).cloned().collect()
    }

    /// 현재 저장된 이벤트 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// 버퍼가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// 버퍼 최대 용량을 반환합니다.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 조회 상한을 반환합니다.
    pub fn max_recent(&self) -> usize {
        self.max_recent
    }

    /// 지금까지 제거된 이벤트 수를 반환합니다.
    pub fn evicted_count(&self) -> u64 {
        self.evicted_count
    }

    /// 총 유입 이벤트 수를 반환합니다.
    pub fn total_received(&self) -> u64 {
        self.total_received
    }
}
