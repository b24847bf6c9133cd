//! TTS Engine Port - 语音合成抽象
//!
//! 定义语音合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

/// SSML 声音性别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SsmlGender {
    Male,
    #[default]
    Female,
    Neutral,
}

/// 合成音频编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    Linear16,
    OggOpus,
}

/// 声音与音频参数（固定配置，不对用户开放）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// 语言代码，如 "ru-RU"
    #[serde(default = "default_language_code")]
    pub language_code: String,

    /// 声音名称，如 "ru-RU-Standard-C"
    #[serde(default = "default_voice_name")]
    pub voice_name: String,

    #[serde(default)]
    pub ssml_gender: SsmlGender,

    #[serde(default)]
    pub audio_encoding: AudioEncoding,

    /// 音量增益（dB），范围 -96.0 ~ 16.0
    #[serde(default = "default_volume_gain_db")]
    pub volume_gain_db: f64,

    /// 语速，范围 0.25 ~ 4.0
    #[serde(default = "default_speaking_rate")]
    pub speaking_rate: f64,

    /// 音调，范围 -20.0 ~ 20.0
    #[serde(default = "default_pitch")]
    pub pitch: f64,

    /// 采样率（Hz）
    #[serde(default = "default_sample_rate_hertz")]
    pub sample_rate_hertz: u32,
}

fn default_language_code() -> String {
    "ru-RU".to_string()
}

fn default_voice_name() -> String {
    "ru-RU-Standard-C".to_string()
}

fn default_volume_gain_db() -> f64 {
    5.0
}

fn default_speaking_rate() -> f64 {
    1.0
}

fn default_pitch() -> f64 {
    5.0
}

fn default_sample_rate_hertz() -> u32 {
    48000
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language_code: default_language_code(),
            voice_name: default_voice_name(),
            ssml_gender: SsmlGender::default(),
            audio_encoding: AudioEncoding::default(),
            volume_gain_db: default_volume_gain_db(),
            speaking_rate: default_speaking_rate(),
            pitch: default_pitch(),
            sample_rate_hertz: default_sample_rate_hertz(),
        }
    }
}

/// 语音合成请求
#[derive(Debug, Clone)]
pub struct SynthesizeRequest {
    /// 要合成的文本块
    pub text: String,
    pub voice: VoiceConfig,
}

/// 语音合成响应
#[derive(Debug, Clone)]
pub struct SynthesizeResponse {
    /// 编码后的音频数据
    pub audio_data: Vec<u8>,
    pub encoding: AudioEncoding,
}

/// TTS Engine Port
///
/// 外部语音合成服务的抽象接口
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 合成一个文本块
    async fn synthesize(&self, request: SynthesizeRequest) -> Result<SynthesizeResponse, TtsError>;

    /// 检查 TTS 服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
