//! hotspot.toml 로딩과 저장
//!
//! [`HotspotConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. `MMDVM_LOG_DIR` 환경변수 (로그 디렉토리 한정)
//! 3. 환경변수 (`HOTSPOT_WPSD_HOST=http://10.0.0.2` 형식)
//! 4. 설정 파일 (`hotspot.toml`, 없으면 기본값으로 생성)
//! 5. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), hotspot_core::error::HotspotError> {
//! use hotspot_core::config::HotspotConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = HotspotConfig::load("hotspot.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = HotspotConfig::parse("[server]\nport = 8080")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ConfigError, HotspotError};

/// 로그 디렉토리를 최우선으로 덮어쓰는 환경변수
pub const LOG_DIR_ENV: &str = "MMDVM_LOG_DIR";

/// wpsd 호스트 URL 최대 길이
pub const MAX_WPSD_HOST_LEN: usize = 2048;

/// Hotspot 통합 설정
///
/// `hotspot.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotspotConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// HTTP API 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 파일 경로 설정
    #[serde(default)]
    pub paths: PathsConfig,
    /// 핫스팟 관리 웹 서비스 (WPSD / Pi-Star) 접속 정보
    #[serde(default)]
    pub wpsd: WpsdConfig,
    /// TGIF 네트워크 설정
    #[serde(default)]
    pub tgif: TgifConfig,
    /// 로그 파이프라인 설정
    #[serde(default)]
    pub log_pipeline: LogPipelineConfig,
    /// Prometheus 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl HotspotConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 파일이 없으면 기본 설정을 파일로 기록한 뒤 기본값으로 진행합니다.
    /// 기록 실패는 경고만 남깁니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, HotspotError> {
        let path = path.as_ref();
        let mut config = match Self::from_file(path).await {
            Ok(config) => config,
            Err(HotspotError::Config(ConfigError::FileNotFound { .. })) => {
                let config = Self::default();
                match config.save(path).await {
                    Ok(()) => info!(path = %path.display(), "wrote default config"),
                    Err(e) => warn!(
                        path = %path.display(),
                        error = %e,
                        "config file missing and default could not be written"
                    ),
                }
                config
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, HotspotError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HotspotError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                HotspotError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, HotspotError> {
        toml::from_str(toml_str).map_err(|e| {
            HotspotError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 설정을 TOML로 직렬화하여 파일에 기록합니다.
    ///
    /// 상위 디렉토리가 없으면 생성합니다.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), HotspotError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeFailed {
            reason: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `HOTSPOT_{SECTION}_{FIELD}`
    /// 예: `HOTSPOT_SERVER_PORT=8080`
    ///
    /// 마지막으로 `MMDVM_LOG_DIR`이 설정되어 있으면 `paths.log_dir`를 덮어씁니다.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "HOTSPOT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "HOTSPOT_GENERAL_LOG_FORMAT");

        // Server
        override_string(&mut self.server.host, "HOTSPOT_SERVER_HOST");
        override_u16(&mut self.server.port, "HOTSPOT_SERVER_PORT");

        // Paths
        override_string(&mut self.paths.log_dir, "HOTSPOT_PATHS_LOG_DIR");
        override_string(&mut self.paths.mmdvm_ini, "HOTSPOT_PATHS_MMDVM_INI");

        // WPSD
        override_string(&mut self.wpsd.host, "HOTSPOT_WPSD_HOST");
        override_string(&mut self.wpsd.username, "HOTSPOT_WPSD_USERNAME");
        override_string(&mut self.wpsd.password, "HOTSPOT_WPSD_PASSWORD");

        // TGIF
        override_string(&mut self.tgif.dmr_id, "HOTSPOT_TGIF_DMR_ID");

        // Log Pipeline
        override_string(
            &mut self.log_pipeline.file_prefix,
            "HOTSPOT_LOG_PIPELINE_FILE_PREFIX",
        );
        override_usize(
            &mut self.log_pipeline.buffer_capacity,
            "HOTSPOT_LOG_PIPELINE_BUFFER_CAPACITY",
        );
        override_usize(
            &mut self.log_pipeline.max_recent,
            "HOTSPOT_LOG_PIPELINE_MAX_RECENT",
        );
        override_u64(
            &mut self.log_pipeline.activity_window_secs,
            "HOTSPOT_LOG_PIPELINE_ACTIVITY_WINDOW_SECS",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "HOTSPOT_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "HOTSPOT_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "HOTSPOT_METRICS_PORT");

        override_string(&mut self.paths.log_dir, LOG_DIR_ENV);
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), HotspotError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.server.port == 0 {
            return Err(invalid("server.port", "must not be 0".to_owned()));
        }

        if self.paths.log_dir.is_empty() {
            return Err(invalid("paths.log_dir", "must not be empty".to_owned()));
        }

        if let Err(reason) = WpsdConfig::normalize_host(&self.wpsd.host) {
            return Err(invalid("wpsd.host", reason));
        }

        if self.log_pipeline.file_prefix.is_empty() {
            return Err(invalid(
                "log_pipeline.file_prefix",
                "must not be empty".to_owned(),
            ));
        }

        if self.log_pipeline.buffer_capacity == 0 {
            return Err(invalid(
                "log_pipeline.buffer_capacity",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.log_pipeline.max_recent == 0 {
            return Err(invalid(
                "log_pipeline.max_recent",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(invalid("metrics.port", "must not be 0".to_owned()));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> HotspotError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// HTTP API 서버 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인드 주소
    pub host: String,
    /// 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 3456,
        }
    }
}

/// 파일 경로 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// MMDVMHost 로그 디렉토리
    pub log_dir: String,
    /// MMDVMHost INI 설정 파일
    pub mmdvm_ini: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            log_dir: "/var/log/pi-star".to_owned(),
            mmdvm_ini: "/etc/mmdvmhost".to_owned(),
        }
    }
}

/// 핫스팟 관리 웹 서비스 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WpsdConfig {
    /// 기본 URL (`http://` 또는 `https://`)
    pub host: String,
    /// Basic auth 사용자명
    pub username: String,
    /// Basic auth 비밀번호
    pub password: String,
}

impl WpsdConfig {
    /// 사용자 입력 호스트 URL을 정규화합니다.
    ///
    /// 앞뒤 공백과 끝의 `/`를 제거하고, 스킴과 길이를 검사합니다.
    pub fn normalize_host(input: &str) -> Result<String, String> {
        let host = input.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err("must not be empty".to_owned());
        }
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err("must start with http:// or https://".to_owned());
        }
        if host.len() > MAX_WPSD_HOST_LEN {
            return Err(format!("must be at most {MAX_WPSD_HOST_LEN} characters"));
        }
        Ok(host.to_owned())
    }
}

impl Default for WpsdConfig {
    fn default() -> Self {
        Self {
            host: "http://192.168.5.82".to_owned(),
            username: "pi-star".to_owned(),
            password: "raspberry".to_owned(),
        }
    }
}

/// TGIF 네트워크 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TgifConfig {
    /// 핫스팟 DMR ID
    pub dmr_id: String,
}

impl Default for TgifConfig {
    fn default() -> Self {
        Self {
            dmr_id: "3221205".to_owned(),
        }
    }
}

/// 로그 파이프라인 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogPipelineConfig {
    /// 로그 파일명 접두어 (`<prefix>-YYYY-MM-DD.log`)
    pub file_prefix: String,
    /// 이벤트 버퍼 용량
    pub buffer_capacity: usize,
    /// 한 번에 조회 가능한 최대 이벤트 수
    pub max_recent: usize,
    /// 서비스를 running으로 판단하는 활동 윈도우 (초)
    pub activity_window_secs: u64,
}

impl Default for LogPipelineConfig {
    fn default() -> Self {
        Self {
            file_prefix: "MMDVM".to_owned(),
            buffer_capacity: 500,
            max_recent: 100,
            activity_window_secs: 300,
        }
    }
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// exporter 활성화 여부
    pub enabled: bool,
    /// exporter 바인드 주소
    pub listen_addr: String,
    /// exporter 포트
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9108,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
