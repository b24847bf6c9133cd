//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::ports::{AudioFormat, JoinStrategy, VoiceConfig};
use crate::domain::chunker::GOOGLE_TTS_MAX_BYTES;

/// 应用主配置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// TTS 服务配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 声音参数
    #[serde(default)]
    pub voice: VoiceConfig,

    /// 分块配置
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// 合成调度配置
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// 音频拼接配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5060
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// TTS 服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// 服务基础 URL
    #[serde(default = "default_tts_base_url")]
    pub base_url: String,

    /// API Key（`?key=`）
    #[serde(default)]
    pub api_key: Option<String>,

    /// OAuth 访问令牌（Bearer），与 api_key 二选一
    #[serde(default)]
    pub access_token: Option<String>,

    /// 请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// 设置后不调用远端服务，每个文本块都返回该文件的内容
    #[serde(default)]
    pub fake_audio_path: Option<PathBuf>,
}

fn default_tts_base_url() -> String {
    "https://texttospeech.googleapis.com".to_string()
}

fn default_tts_timeout() -> u64 {
    60
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: default_tts_base_url(),
            api_key: None,
            access_token: None,
            timeout_secs: default_tts_timeout(),
            fake_audio_path: None,
        }
    }
}

/// 分块配置
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingConfig {
    /// 每块最大 UTF-8 字节数
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_max_bytes() -> usize {
    GOOGLE_TTS_MAX_BYTES
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

/// 合成调度配置
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    /// 同时进行中的合成请求数，1 为严格顺序
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_max_concurrent() -> usize {
    1
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// 音频拼接配置
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// 拼接策略: in_process, ffmpeg
    #[serde(default)]
    pub join_strategy: JoinStrategy,

    /// 输出格式: mp3, wav
    #[serde(default)]
    pub output_format: AudioFormat,

    /// ffmpeg 可执行文件路径
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            join_strategy: JoinStrategy::default(),
            output_format: AudioFormat::default(),
            ffmpeg_path: default_ffmpeg_path(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 生成音频的输出目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 上传文件最大大小（字节），默认 50MB
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/output")
}

fn default_max_upload_size() -> u64 {
    50 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
