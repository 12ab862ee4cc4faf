//! 음성 이벤트와 서비스 상태 도메인 타입
//!
//! 로그 파이프라인이 생성하고 HTTP 계층이 직렬화하는 데이터 구조를 정의합니다.
//! JSON 필드명은 기존 대시보드 UI와의 호환을 위해 고정되어 있습니다.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 디지털 음성 프로토콜
///
/// `Nxdn`은 로컬 로그 파서가 생성하지 않으며, 외부 last-heard 피드 등에서
/// 전달되는 데이터를 표현하기 위해 존재합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// 슬롯 기반 DMR
    #[serde(rename = "DMR")]
    Dmr,
    /// 리플렉터 기반 D-Star
    #[serde(rename = "D-Star")]
    DStar,
    /// System Fusion
    #[serde(rename = "YSF")]
    Ysf,
    /// P25 Phase 1 (trunked)
    #[serde(rename = "P25")]
    P25,
    /// NXDN (trunked narrowband)
    #[serde(rename = "NXDN")]
    Nxdn,
}

impl Mode {
    /// 로그 메시지와 JSON에서 사용하는 프로토콜 태그
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dmr => "DMR",
            Self::DStar => "D-Star",
            Self::Ysf => "YSF",
            Self::P25 => "P25",
            Self::Nxdn => "NXDN",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 전송 경로 (무선 수신 또는 네트워크 중계)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    /// 무선(RF) 수신
    #[serde(rename = "RF")]
    Rf,
    /// 네트워크 중계
    #[serde(rename = "Network")]
    Network,
}

impl Origin {
    /// 로그에 캡처된 단어에서 origin을 결정합니다.
    ///
    /// 대소문자 구분 없이 "RF"인 경우에만 `Rf`, 그 외에는 모두 `Network`입니다.
    pub fn from_log_word(word: &str) -> Self {
        if word.eq_ignore_ascii_case("rf") {
            Self::Rf
        } else {
            Self::Network
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rf => write!(f, "RF"),
            Self::Network => write!(f, "Network"),
        }
    }
}

/// DMR 타임슬롯 (TS1 / TS2)
///
/// JSON에서는 정수 `1` 또는 `2`로 표현됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeslot {
    /// 타임슬롯 1
    One,
    /// 타임슬롯 2
    Two,
}

impl Timeslot {
    /// 로그의 슬롯 숫자를 해석합니다. "1"만 TS1이고 나머지는 TS2로 취급합니다.
    pub fn from_log_digit(digit: &str) -> Self {
        if digit == "1" { Self::One } else { Self::Two }
    }

    /// 1 또는 2
    pub fn number(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl TryFrom<u8> for Timeslot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(format!("timeslot must be 1 or 2, got {other}")),
        }
    }
}

impl Serialize for Timeslot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

impl<'de> Deserialize<'de> for Timeslot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// 수신 신호 세기 (dBm)
///
/// 샘플이 3개 이상이면 min/avg/max, 그 외에는 첫 샘플 값만 보고합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rssi {
    /// 단일 샘플
    Single(i32),
    /// 다중 샘플 요약
    Range {
        /// 최소값
        min: i32,
        /// 산술 평균 (반올림)
        avg: i32,
        /// 최대값
        max: i32,
    },
}

impl Rssi {
    /// 샘플 목록에서 RSSI 값을 만듭니다. 샘플이 없으면 `None`입니다.
    pub fn from_samples(samples: &[i32]) -> Option<Self> {
        let first = *samples.first()?;
        if samples.len() < 3 {
            return Some(Self::Single(first));
        }

        let min = samples.iter().copied().min().unwrap_or(first);
        let max = samples.iter().copied().max().unwrap_or(first);
        let sum: i64 = samples.iter().map(|&s| i64::from(s)).sum();
        let avg = (sum as f64 / samples.len() as f64).round() as i32;

        Some(Self::Range { min, avg, max })
    }
}

/// 정규화된 음성 전송 이벤트
///
/// 네 가지 프로토콜의 로그 라인이 모두 이 형식으로 변환됩니다.
/// 생성 이후에는 변경할 수 없으며, [`VoiceEventBuilder`]를 통해서만 만들 수 있습니다.
///
/// # 불변 조건
/// - `ber`는 `origin == Rf`일 때만, `loss`는 `origin == Network`일 때만 존재합니다.
/// - `callsign`, `target`은 알 수 없을 때 빈 문자열입니다 (null 아님).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceEvent {
    #[serde(with = "timestamp_millis")]
    timestamp: DateTime<Utc>,
    mode: Mode,
    callsign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    src: Option<u32>,
    target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeslot: Option<Timeslot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rssi: Option<Rssi>,
    origin: Origin,
    #[serde(default)]
    raw: String,
}

impl VoiceEvent {
    /// 필수 필드로 빌더를 시작합니다.
    pub fn builder(
        timestamp: DateTime<Utc>,
        mode: Mode,
        origin: Origin,
        raw: impl Into<String>,
    ) -> VoiceEventBuilder {
        VoiceEventBuilder {
            event: Self {
                timestamp,
                mode,
                callsign: String::new(),
                src: None,
                target: String::new(),
                target_id: None,
                timeslot: None,
                duration: None,
                ber: None,
                loss: None,
                rssi: None,
                origin,
                raw: raw.into(),
            },
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn callsign(&self) -> &str {
        &self.callsign
    }

    pub fn src(&self) -> Option<u32> {
        self.src
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn target_id(&self) -> Option<u32> {
        self.target_id
    }

    pub fn timeslot(&self) -> Option<Timeslot> {
        self.timeslot
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn ber(&self) -> Option<f64> {
        self.ber
    }

    pub fn loss(&self) -> Option<f64> {
        self.loss
    }

    pub fn rssi(&self) -> Option<Rssi> {
        self.rssi
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for VoiceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} -> {}",
            self.mode, self.origin, self.callsign, self.target,
        )
    }
}

/// [`VoiceEvent`] 빌더
///
/// `build()` 시점에 origin과 모순되는 품질 지표(RF의 loss, Network의 BER)를 제거합니다.
#[derive(Debug, Clone)]
pub struct VoiceEventBuilder {
    event: VoiceEvent,
}

impl VoiceEventBuilder {
    pub fn callsign(mut self, callsign: impl Into<String>) -> Self {
        self.event.callsign = callsign.into();
        self
    }

    pub fn src(mut self, src: Option<u32>) -> Self {
        self.event.src = src;
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.event.target = target.into();
        self
    }

    pub fn target_id(mut self, target_id: Option<u32>) -> Self {
        self.event.target_id = target_id;
        self
    }

    pub fn timeslot(mut self, timeslot: Timeslot) -> Self {
        self.event.timeslot = Some(timeslot);
        self
    }

    /// 전송 시간(초). 음수나 NaN은 무시합니다.
    pub fn duration(mut self, duration: Option<f64>) -> Self {
        self.event.duration = duration.filter(|d| d.is_finite() && *d >= 0.0);
        self
    }

    pub fn ber(mut self, ber: Option<f64>) -> Self {
        self.event.ber = ber.filter(|v| v.is_finite());
        self
    }

    pub fn loss(mut self, loss: Option<f64>) -> Self {
        self.event.loss = loss.filter(|v| v.is_finite());
        self
    }

    pub fn rssi(mut self, rssi: Option<Rssi>) -> Self {
        self.event.rssi = rssi;
        self
    }

    /// 불변 조건을 적용하여 이벤트를 생성합니다.
    pub fn build(mut self) -> VoiceEvent {
        match self.event.origin {
            Origin::Rf => self.event.loss = None,
            Origin::Network => self.event.ber = None,
        }
        self.event
    }
}

/// 서비스 상태 (MMDVMHost 활동 기반으로 추정)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    /// 최근 활동 있음
    Running,
    /// 활동이 오래됨
    Stopped,
    /// 활동 기록 없음 또는 로그 디렉토리 없음
    Unknown,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// 서비스 상태 조회 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    /// 파생된 상태
    pub mmdvm_host: ServiceState,
    /// 마지막 활동 시각 (기록이 있을 때만)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_timestamp_millis"
    )]
    pub last_activity: Option<DateTime<Utc>>,
    /// 로그 디렉토리 부재 등 설명 메시지
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// RFC 3339 밀리초 정밀도(`2024-01-01T12:00:00.000Z`) 직렬화
pub mod timestamp_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

mod optional_timestamp_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        ts: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => super::timestamp_millis::serialize(ts, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}
