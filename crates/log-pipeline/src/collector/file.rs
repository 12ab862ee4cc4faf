//! 로그 파일 tail 수집기 -- 일자별 MMDVMHost 로그에서 새 라인을 읽습니다.
//!
//! [`LogTail`]은 로그 디렉토리를 notify로 감시하고, 파일별 바이트 오프셋을
//! 유지하여 이미 읽은 라인을 다시 처리하지 않습니다.
//!
//! # 동작 순서
//! 1. 로그 디렉토리가 없으면 경고를 남기고 종료 (상태는 `Error`)
//! 2. 오늘 날짜 파일을 처음부터 읽음
//! 3. 디렉토리 감시 시작 후, 오늘 이후 날짜의 기존 파일을 재생
//! 4. 변경 알림마다 해당 파일의 오프셋 이후만 읽음
//!
//! # 오프셋 규칙
//! - 파일 길이가 오프셋보다 작으면 잘린 것으로 보고 처음부터 다시 읽음
//! - 개행으로 끝나지 않은 마지막 라인은 다음 읽기까지 보류
//! - 유효하지 않은 UTF-8은 손실 변환

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{NaiveDate, Utc};
use metrics::counter;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hotspot_core::metrics as m;
use hotspot_core::types::VoiceEvent;

use super::{CollectorStatus, is_log_file, log_file_name};
use crate::config::PipelineConfig;
use crate::error::LogPipelineError;
use crate::parser::LineDecoder;
use crate::traffic::LiveTraffic;

/// notify 콜백 → 수집 태스크 채널 용량
const NOTIFY_CHANNEL_CAPACITY: usize = 1024;

/// 한 번의 읽기 결과
#[derive(Debug, Default)]
struct ReadChunk {
    events: Vec<VoiceEvent>,
    lines: u64,
    unmatched: u64,
    next_offset: u64,
    truncated: bool,
}

/// MMDVMHost 로그 디렉토리 tail 수집기
pub struct LogTail {
    log_dir: PathBuf,
    file_prefix: String,
    decoder: Arc<LineDecoder>,
    traffic: LiveTraffic,
    offsets: HashMap<PathBuf, u64>,
    status: Arc<RwLock<CollectorStatus>>,
}

impl LogTail {
    /// 새 수집기를 생성합니다.
    pub fn new(config: &PipelineConfig, decoder: Arc<LineDecoder>, traffic: LiveTraffic) -> Self {
        Self {
            log_dir: config.log_dir.clone(),
            file_prefix: config.file_prefix.clone(),
            decoder,
            traffic,
            offsets: HashMap::new(),
            status: Arc::new(RwLock::new(CollectorStatus::Idle)),
        }
    }

    /// 외부에서 상태를 조회하기 위한 공유 핸들
    pub fn status_handle(&self) -> Arc<RwLock<CollectorStatus>> {
        Arc::clone(&self.status)
    }

    /// 현재 수집기 상태
    pub fn status(&self) -> CollectorStatus {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 파일의 현재 읽기 오프셋
    pub fn offset(&self, path: &Path) -> Option<u64> {
        self.offsets.get(path).copied()
    }

    /// 주어진 날짜의 로그 파일 경로
    pub fn path_for_date(&self, date: NaiveDate) -> PathBuf {
        self.log_dir.join(log_file_name(&self.file_prefix, date))
    }

    /// 오늘(UTC) 로그 파일 경로
    pub fn today_path(&self) -> PathBuf {
        self.path_for_date(Utc::now().date_naive())
    }

    fn set_status(&self, status: CollectorStatus) {
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = status;
    }

    /// 파일의 오프셋 이후 완성된 라인을 읽어 디코딩하고 버퍼에 추가합니다.
    ///
    /// 새로 추가된 이벤트 수를 반환합니다.
    pub async fn ingest(&mut self, path: &Path) -> Result<usize, LogPipelineError> {
        let offset = self.offset(path).unwrap_or(0);
        let owned = path.to_path_buf();
        let decoder = Arc::clone(&self.decoder);

        let chunk = tokio::task::spawn_blocking(move || read_chunk(&owned, offset, &decoder))
            .await
            .map_err(|e| LogPipelineError::Collector {
                source_type: "file".to_owned(),
                reason: format!("read task failed: {e}"),
            })??;

        if chunk.truncated {
            info!(path = %path.display(), "log file truncated, reading from start");
        }
        self.offsets.insert(path.to_path_buf(), chunk.next_offset);

        if chunk.lines > 0 {
            counter!(m::LOG_PIPELINE_LINES_READ_TOTAL).increment(chunk.lines);
        }
        if chunk.unmatched > 0 {
            counter!(m::LOG_PIPELINE_LINES_UNMATCHED_TOTAL).increment(chunk.unmatched);
        }

        Ok(self.traffic.ingest(chunk.events))
    }

    /// [`ingest`](Self::ingest)를 호출하고 실패는 경고로만 남깁니다.
    async fn ingest_logged(&mut self, path: &Path) {
        match self.ingest(path).await {
            Ok(0) => {}
            Ok(count) => debug!(path = %path.display(), count, "voice events ingested"),
            Err(e) => {
                counter!(m::LOG_PIPELINE_READ_ERRORS_TOTAL).increment(1);
                warn!(path = %path.display(), error = %e, "failed to read log file");
                if matches!(&e, LogPipelineError::Io(io) if io.kind() == io::ErrorKind::NotFound) {
                    self.offsets.remove(path);
                }
            }
        }
    }

    /// 취소될 때까지 로그 디렉토리를 감시합니다.
    ///
    /// 오프셋은 호출 간에 유지되므로 재시작해도 같은 라인을 다시 읽지 않습니다.
    /// 로그 디렉토리가 없으면 즉시 `Ok(())`를 반환합니다.
    /// 감시자 생성에 실패하면 에러를 반환합니다.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), LogPipelineError> {
        if !self.log_dir.is_dir() {
            warn!(
                log_dir = %self.log_dir.display(),
                "log dir does not exist, live traffic will stay empty"
            );
            self.set_status(CollectorStatus::Error(format!(
                "Log dir not found: {}",
                self.log_dir.display()
            )));
            return Ok(());
        }

        self.set_status(CollectorStatus::Running);

        let today = self.today_path();
        if today.is_file() {
            self.ingest_logged(&today).await;
        }

        let (tx, mut rx) = mpsc::channel::<PathBuf>(NOTIFY_CHANNEL_CAPACITY);
        // drop 시 감시 종료
        let _watcher = match self.watch(tx) {
            Ok(watcher) => watcher,
            Err(e) => {
                self.set_status(CollectorStatus::Error(e.to_string()));
                return Err(e);
            }
        };

        self.replay_existing().await;

        info!(
            log_dir = %self.log_dir.display(),
            prefix = %self.file_prefix,
            events = self.traffic.len(),
            "log tail started"
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("log tail cancelled");
                    break;
                }
                received = rx.recv() => {
                    let Some(first) = received else {
                        warn!("watch channel closed, log tail stopping");
                        break;
                    };
                    // 연속 알림은 파일당 한 번만 읽음
                    let mut pending = BTreeSet::from([first]);
                    while let Ok(path) = rx.try_recv() {
                        pending.insert(path);
                    }
                    for path in pending {
                        self.ingest_logged(&path).await;
                    }
                }
            }
        }

        self.set_status(CollectorStatus::Stopped);
        Ok(())
    }

    /// 로그 디렉토리에 대한 notify 감시자를 생성합니다.
    fn watch(&self, tx: mpsc::Sender<PathBuf>) -> Result<RecommendedWatcher, LogPipelineError> {
        let prefix = self.file_prefix.clone();
        let to_error = |e: notify::Error| LogPipelineError::Watch {
            path: self.log_dir.display().to_string(),
            reason: e.to_string(),
        };

        let mut watcher: RecommendedWatcher = Watcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        return;
                    }
                    for path in event.paths {
                        if is_log_file(&prefix, &path) {
                            forward_change(&tx, path);
                        }
                    }
                }
                Err(e) => warn!(error = %e, "log dir watch error"),
            },
            notify::Config::default(),
        )
        .map_err(to_error)?;

        watcher
            .watch(&self.log_dir, RecursiveMode::NonRecursive)
            .map_err(to_error)?;

        Ok(watcher)
    }

    /// 오늘 이후 날짜의 기존 로그 파일을 이름순으로 읽습니다.
    ///
    /// 이전 날짜 파일은 변경될 때만 읽습니다.
    async fn replay_existing(&mut self) {
        let today_name = log_file_name(&self.file_prefix, Utc::now().date_naive());

        let mut entries = match tokio::fs::read_dir(&self.log_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(log_dir = %self.log_dir.display(), error = %e, "failed to list log dir");
                return;
            }
        };

        let mut paths = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let current = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name >= today_name.as_str());
            if current && is_log_file(&self.file_prefix, &path) {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            self.ingest_logged(&path).await;
        }
    }
}

/// `offset` 이후의 완성된 라인을 읽고 디코딩합니다.
fn read_chunk(path: &Path, offset: u64, decoder: &LineDecoder) -> io::Result<ReadChunk> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();

    let truncated = len < offset;
    let start = if truncated { 0 } else { offset };
    if len == start {
        return Ok(ReadChunk {
            next_offset: start,
            truncated,
            ..ReadChunk::default()
        });
    }

    file.seek(SeekFrom::Start(start))?;
    let mut bytes = Vec::new();
    file.take(len - start).read_to_end(&mut bytes)?;

    let complete = bytes
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |index| index + 1);
    bytes.truncate(complete);

    let mut chunk = ReadChunk {
        next_offset: start + complete as u64,
        truncated,
        ..ReadChunk::default()
    };

    for line in String::from_utf8_lossy(&bytes).lines() {
        if line.trim().is_empty() {
            continue;
        }
        chunk.lines += 1;
        match decoder.decode(line) {
            Some(event) => chunk.events.push(event),
            None => chunk.unmatched += 1,
        }
    }

    Ok(chunk)
}

/// notify 콜백에서 변경된 경로를 수집 태스크로 전달합니다.
///
/// 채널이 가득 차면 자리가 날 때까지 대기하므로 알림은 유실되지 않습니다.
/// notify 스레드 전용이며 tokio 런타임 안에서 호출하면 안 됩니다.
/// 수집 태스크가 종료되었으면 `false`를 반환합니다.
fn forward_change(tx: &mpsc::Sender<PathBuf>, path: PathBuf) -> bool {
    match tx.try_send(path) {
        Ok(()) => true,
        Err(TrySendError::Full(path)) => {
            debug!(path = %path.display(), "tail channel full, waiting");
            tx.blocking_send(path).is_ok()
        }
        Err(TrySendError::Closed(path)) => {
            debug!(path = %path.display(), "tail stopped, change notification dropped");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use hotspot_core::types::Mode;

    const DMR_LINE: &str =
        "M: 2024-01-01 12:00:00.123 DMR Slot 2, received RF voice header from K6JM to TG 91";
    const YSF_LINE: &str =
        "M: 2024-01-01 12:00:05.000 YSF, received network voice header from K6JM to DG-ID 0";
    const NOISE_LINE: &str = "I: 2024-01-01 12:00:06.000 MMDVMHost-20230101 is running";

    fn setup(dir: &Path) -> (LogTail, LiveTraffic) {
        let config = PipelineConfig {
            log_dir: dir.to_path_buf(),
            ..PipelineConfig::default()
        };
        let traffic = LiveTraffic::new(&config);
        let decoder = Arc::new(LineDecoder::with_defaults().unwrap());
        (LogTail::new(&config, decoder, traffic.clone()), traffic)
    }

    fn append(path: &Path, text: &str) {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn ingest_reads_whole_file_and_skips_noise() {
        let dir = tempfile::tempdir().unwrap();
        let (mut tail, traffic) = setup(dir.path());
        let path = dir.path().join("MMDVM-2024-01-01.log");
        append(&path, &format!("{DMR_LINE}\n\n{NOISE_LINE}\n{YSF_LINE}\n"));

        assert_eq!(tail.ingest(&path).await.unwrap(), 2);
        let recent = traffic.recent(10);
        assert_eq!(recent[0].mode(), Mode::Ysf);
        assert_eq!(recent[1].mode(), Mode::Dmr);
        assert_eq!(tail.offset(&path), Some(std::fs::metadata(&path).unwrap().len()));
    }

    #[tokio::test]
    async fn repeated_ingest_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let (mut tail, traffic) = setup(dir.path());
        let path = dir.path().join("MMDVM-2024-01-01.log");
        append(&path, &format!("{DMR_LINE}\n"));

        assert_eq!(tail.ingest(&path).await.unwrap(), 1);
        assert_eq!(tail.ingest(&path).await.unwrap(), 0);
        assert_eq!(traffic.len(), 1);
    }

    #[tokio::test]
    async fn appended_lines_are_read_incrementally() {
        let dir = tempfile::tempdir().unwrap();
        let (mut tail, traffic) = setup(dir.path());
        let path = dir.path().join("MMDVM-2024-01-01.log");
        append(&path, &format!("{DMR_LINE}\n"));
        tail.ingest(&path).await.unwrap();

        append(&path, &format!("{YSF_LINE}\n"));
        assert_eq!(tail.ingest(&path).await.unwrap(), 1);
        assert_eq!(traffic.len(), 2);
        assert_eq!(traffic.recent(1)[0].mode(), Mode::Ysf);
    }

    #[tokio::test]
    async fn partial_line_waits_for_newline() {
        let dir = tempfile::tempdir().unwrap();
        let (mut tail, traffic) = setup(dir.path());
        let path = dir.path().join("MMDVM-2024-01-01.log");
        let (head, rest) = YSF_LINE.split_at(30);

        append(&path, &format!("{DMR_LINE}\n{head}"));
        assert_eq!(tail.ingest(&path).await.unwrap(), 1);
        assert_eq!(tail.offset(&path), Some(DMR_LINE.len() as u64 + 1));

        append(&path, &format!("{rest}\n"));
        assert_eq!(tail.ingest(&path).await.unwrap(), 1);
        assert_eq!(traffic.recent(1)[0].callsign(), "K6JM");
        assert_eq!(traffic.recent(1)[0].mode(), Mode::Ysf);
    }

    #[tokio::test]
    async fn truncated_file_is_reread_from_start() {
        let dir = tempfile::tempdir().unwrap();
        let (mut tail, traffic) = setup(dir.path());
        let path = dir.path().join("MMDVM-2024-01-01.log");
        append(&path, &format!("{DMR_LINE}\n{YSF_LINE}\n"));
        tail.ingest(&path).await.unwrap();

        std::fs::write(&path, format!("{YSF_LINE}\n")).unwrap();
        assert_eq!(tail.ingest(&path).await.unwrap(), 1);
        assert_eq!(traffic.len(), 3);
    }

    #[tokio::test]
    async fn crlf_lines_are_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let (mut tail, traffic) = setup(dir.path());
        let path = dir.path().join("MMDVM-2024-01-01.log");
        append(&path, &format!("{DMR_LINE}\r\n{YSF_LINE}\r\n"));

        assert_eq!(tail.ingest(&path).await.unwrap(), 2);
        assert!(!traffic.recent(1)[0].raw().ends_with('\r'));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut tail, _) = setup(dir.path());
        let err = tail
            .ingest(&dir.path().join("MMDVM-1999-01-01.log"))
            .await
            .unwrap_err();
        assert!(matches!(err, LogPipelineError::Io(_)));
    }

    #[tokio::test]
    async fn run_without_log_dir_returns_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let (mut tail, _) = setup(&dir.path().join("missing"));
        let status = tail.status_handle();

        tail.run(CancellationToken::new()).await.unwrap();
        assert!(matches!(
            &*status.read().unwrap(),
            CollectorStatus::Error(msg) if msg.starts_with("Log dir not found")
        ));
    }

    #[tokio::test]
    async fn run_reads_today_file_and_stops_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let (mut tail, traffic) = setup(dir.path());
        append(&tail.today_path(), &format!("{DMR_LINE}\n"));
        let status = tail.status_handle();

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move { tail.run(token).await });

        for _ in 0..200 {
            if traffic.len() == 1 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(traffic.len(), 1);

        cancel.cancel();
        handle.await.unwrap().unwrap();
        assert_eq!(*status.read().unwrap(), CollectorStatus::Stopped);
    }

    #[test]
    fn read_chunk_on_empty_file_keeps_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MMDVM-2024-01-01.log");
        std::fs::write(&path, "").unwrap();
        let decoder = LineDecoder::with_defaults().unwrap();

        let chunk = read_chunk(&path, 0, &decoder).unwrap();
        assert_eq!(chunk.next_offset, 0);
        assert!(chunk.events.is_empty());
        assert!(!chunk.truncated);
    }

    #[test]
    fn read_chunk_handles_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MMDVM-2024-01-01.log");
        let mut bytes = b"M: 2024-01-01 12:00:00.000 \xff\xfe garbage\n".to_vec();
        bytes.extend_from_slice(format!("{DMR_LINE}\n").as_bytes());
        std::fs::write(&path, &bytes).unwrap();
        let decoder = LineDecoder::with_defaults().unwrap();

        let chunk = read_chunk(&path, 0, &decoder).unwrap();
        assert_eq!(chunk.lines, 2);
        assert_eq!(chunk.unmatched, 1);
        assert_eq!(chunk.events.len(), 1);
        assert_eq!(chunk.next_offset, bytes.len() as u64);
    }

    #[tokio::test]
    async fn forward_change_waits_when_channel_full() {
        let (tx, mut rx) = mpsc::channel(1);
        assert!(forward_change(&tx, PathBuf::from("MMDVM-2024-01-01.log")));

        let sender = std::thread::spawn(move || {
            forward_change(&tx, PathBuf::from("MMDVM-2024-01-02.log"))
        });

        assert_eq!(rx.recv().await.unwrap(), PathBuf::from("MMDVM-2024-01-01.log"));
        assert_eq!(rx.recv().await.unwrap(), PathBuf::from("MMDVM-2024-01-02.log"));
        assert!(sender.join().unwrap());
    }

    #[test]
    fn forward_change_reports_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        assert!(!forward_change(&tx, PathBuf::from("MMDVM-2024-01-01.log")));
    }
}
