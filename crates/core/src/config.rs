use config::{Config, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
/// Request body limit; uploads arrive base64 encoded inside JSON.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub max_upload_bytes: usize,
    /// Sessions unused for this long are evicted.
    pub session_idle_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    pub model: String,
    pub api_base: String,
    pub api_key: Option<Secret<String>>,
    pub timeout_ms: u64,
    pub enable_search: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub json_logs: bool,
    pub metrics_enabled: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("FANPLAY_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.enable_cors", true)?
            .set_default("server.max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES as u64)?
            .set_default("server.session_idle_secs", DEFAULT_SESSION_IDLE_SECS)?
            .set_default("engine.model", DEFAULT_MODEL)?
            .set_default("engine.api_base", DEFAULT_API_BASE)?
            .set_default("engine.timeout_ms", 60_000)?
            .set_default("engine.enable_search", true)?
            .set_default("telemetry.json_logs", false)?
            .set_default("telemetry.metrics_enabled", true)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__ENGINE__MODEL=... to engine.model
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut cfg: Self = s.try_deserialize()?;
        if cfg.engine.api_key.is_none() {
            cfg.engine.api_key = std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .ok()
                .map(Secret::new);
        }
        Ok(cfg)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 3000,
                enable_cors: true,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
                session_idle_secs: DEFAULT_SESSION_IDLE_SECS,
            },
            engine: EngineConfig {
                model: DEFAULT_MODEL.into(),
                api_base: DEFAULT_API_BASE.into(),
                api_key: None,
                timeout_ms: 60_000,
                enable_search: true,
            },
            telemetry: TelemetryConfig {
                json_logs: false,
                metrics_enabled: true,
            },
        }
    }
}
