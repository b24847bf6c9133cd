//! Audio Joiner Port - 音频拼接抽象
//!
//! 按顺序拼接多段同编码的音频，导出为单个文件。
//! 两种实现：进程内解码拼接（symphonia）、外部工具拼接（ffmpeg）

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 拼接错误
#[derive(Debug, Error)]
pub enum JoinError {
    #[error("No audio clips to join")]
    Empty,

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input (clip {index}): {message}")]
    InvalidInput { index: usize, message: String },

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("External tool error: {0}")]
    External(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for JoinError {
    fn from(err: std::io::Error) -> Self {
        JoinError::IoError(err.to_string())
    }
}

/// 音频输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3 格式 - 流参数一致时帧级拼接，否则重新编码
    #[default]
    Mp3,
    /// WAV 格式 - 解码为 16 位 PCM
    Wav,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav => "audio/wav",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = JoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mp3" => Ok(AudioFormat::Mp3),
            "wav" => Ok(AudioFormat::Wav),
            _ => Err(JoinError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// 拼接策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JoinStrategy {
    /// 进程内解码、追加、导出
    #[default]
    InProcess,
    /// 写临时文件，交给 ffmpeg concat 拼接
    Ffmpeg,
}

impl std::fmt::Display for JoinStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinStrategy::InProcess => write!(f, "in_process"),
            JoinStrategy::Ffmpeg => write!(f, "ffmpeg"),
        }
    }
}

/// 待拼接的音频片段
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// 片段顺序
    pub index: usize,
    /// 编码后的音频数据（MP3）
    pub data: Vec<u8>,
}

impl AudioClip {
    pub fn new(index: usize, data: Vec<u8>) -> Self {
        Self { index, data }
    }
}

/// 拼接结果
#[derive(Debug, Clone)]
pub struct JoinedAudio {
    pub data: Vec<u8>,
    pub format: AudioFormat,
    /// 时长（毫秒）
    pub duration_ms: u64,
    /// 参与拼接的片段数
    pub clip_count: usize,
}

/// Audio Joiner Port
///
/// 拼接必须保持输入顺序
#[async_trait]
pub trait AudioJoinerPort: Send + Sync {
    /// 按 `clips` 的顺序拼接
    async fn join(&self, clips: &[AudioClip], format: AudioFormat) -> Result<JoinedAudio, JoinError>;

    /// 当前实现的策略
    fn strategy(&self) -> JoinStrategy;
}
