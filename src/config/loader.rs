//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;
use crate::application::ports::{AudioEncoding, AudioFormat};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "CHAPTERCAST";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `CHAPTERCAST_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `CHAPTERCAST_SERVER__PORT=8080`
/// - `CHAPTERCAST_TTS__API_KEY=...`
/// - `CHAPTERCAST_AUDIO__JOIN_STRATEGY=ffmpeg`
/// - `CHAPTERCAST_VOICE__SPEAKING_RATE=1.2`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5060)?
        .set_default("tts.base_url", "https://texttospeech.googleapis.com")?
        .set_default("tts.timeout_secs", 60)?
        .set_default("chunking.max_bytes", 4970)?
        .set_default("synthesis.max_concurrent", 1)?
        .set_default("audio.join_strategy", "in_process")?
        .set_default("audio.output_format", "mp3")?
        .set_default("audio.ffmpeg_path", "ffmpeg")?
        .set_default("storage.output_dir", "data/output")?
        .set_default("storage.max_upload_size", 50 * 1024 * 1024)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: CHAPTERCAST_TTS__BASE_URL=http://localhost:9000
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("Server port cannot be 0"));
    }

    if config.tts.base_url.is_empty() {
        return Err(invalid("TTS base URL cannot be empty"));
    }

    if config.tts.fake_audio_path.is_none()
        && config.tts.api_key.is_none()
        && config.tts.access_token.is_none()
    {
        return Err(invalid(
            "tts.api_key or tts.access_token is required (or tts.fake_audio_path for offline use)",
        ));
    }

    if config.chunking.max_bytes == 0 {
        return Err(invalid("chunking.max_bytes must be greater than 0"));
    }

    if config.synthesis.max_concurrent == 0 {
        return Err(invalid("synthesis.max_concurrent must be at least 1"));
    }

    let voice = &config.voice;
    if !(0.25..=4.0).contains(&voice.speaking_rate) {
        return Err(invalid("voice.speaking_rate must be within 0.25..=4.0"));
    }
    if !(-20.0..=20.0).contains(&voice.pitch) {
        return Err(invalid("voice.pitch must be within -20.0..=20.0"));
    }
    if !(-96.0..=16.0).contains(&voice.volume_gain_db) {
        return Err(invalid("voice.volume_gain_db must be within -96.0..=16.0"));
    }

    // 拼接器只处理 MP3 片段
    match voice.audio_encoding {
        AudioEncoding::Mp3 => {}
        AudioEncoding::Linear16 if config.audio.output_format == AudioFormat::Wav => {}
        other => {
            return Err(invalid(format!(
                "voice.audio_encoding {:?} cannot be joined into {} output",
                other, config.audio.output_format
            )))
        }
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    let credentials = match (&config.tts.api_key, &config.tts.access_token) {
        _ if config.tts.fake_audio_path.is_some() => "fake",
        (Some(_), _) => "api_key",
        (None, Some(_)) => "access_token",
        (None, None) => "none",
    };

    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("TTS URL: {}", config.tts.base_url);
    tracing::info!("TTS Credentials: {}", credentials);
    tracing::info!("TTS Timeout: {}s", config.tts.timeout_secs);
    tracing::info!(
        "Voice: {} ({}), rate={}, pitch={}, gain={}dB",
        config.voice.voice_name,
        config.voice.language_code,
        config.voice.speaking_rate,
        config.voice.pitch,
        config.voice.volume_gain_db
    );
    tracing::info!("Chunk Max Bytes: {}", config.chunking.max_bytes);
    tracing::info!("Max Concurrent Requests: {}", config.synthesis.max_concurrent);
    tracing::info!(
        "Join Strategy: {} -> {}",
        config.audio.join_strategy,
        config.audio.output_format
    );
    tracing::info!("Output Directory: {:?}", config.storage.output_dir);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::JoinStrategy;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.tts.api_key = Some("test-key".to_string());
        config
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validation_requires_credentials() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.tts.fake_audio_path = Some("clip.mp3".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = valid_config();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_chunk_size() {
        let mut config = valid_config();
        config.chunking.max_bytes = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_voice_ranges() {
        let mut config = valid_config();
        config.voice.speaking_rate = 5.0;
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.voice.pitch = -21.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_of_encoding_and_output() {
        let mut config = valid_config();
        config.voice.audio_encoding = AudioEncoding::OggOpus;
        assert!(validate_config(&config).is_err());

        config.voice.audio_encoding = AudioEncoding::Linear16;
        assert!(validate_config(&config).is_err());

        config.audio.output_format = AudioFormat::Wav;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 8080

[tts]
api_key = "from-file"

[voice]
voice_name = "ru-RU-Wavenet-A"
speaking_rate = 1.25

[chunking]
max_bytes = 40

[audio]
join_strategy = "ffmpeg"
output_format = "wav"
"#,
        )
        .unwrap();

        let config = load_config_from_path(Some(&path)).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.tts.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.voice.voice_name, "ru-RU-Wavenet-A");
        assert_eq!(config.voice.language_code, "ru-RU");
        assert_eq!(config.voice.speaking_rate, 1.25);
        assert_eq!(config.chunking.max_bytes, 40);
        assert_eq!(config.audio.join_strategy, JoinStrategy::Ffmpeg);
        assert_eq!(config.audio.output_format, AudioFormat::Wav);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_from_path(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
