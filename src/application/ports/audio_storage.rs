//! Audio Storage Port - 出站端口
//!
//! 生成的音频文件写入固定输出目录，供后续播放和下载

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// 音频存储错误
#[derive(Debug, Error)]
pub enum AudioStorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 已保存的音频文件
#[derive(Debug, Clone)]
pub struct StoredAudio {
    pub file_name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_at: Option<DateTime<Utc>>,
}

/// 校验文件名：只允许单层文件名，不允许路径分隔符和 `..`
pub fn validate_file_name(name: &str) -> Result<(), AudioStorageError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0');

    if valid {
        Ok(())
    } else {
        Err(AudioStorageError::InvalidName(name.to_string()))
    }
}

/// Audio Storage Port - 出站端口
#[async_trait]
pub trait AudioStoragePort: Send + Sync {
    /// 获取文件完整路径
    fn get_audio_path(&self, file_name: &str) -> Result<PathBuf, AudioStorageError>;

    /// 保存音频（同名文件会被覆盖）
    async fn save_audio(&self, file_name: &str, data: &[u8])
        -> Result<StoredAudio, AudioStorageError>;

    /// 读取音频
    async fn read_audio(&self, file_name: &str) -> Result<Vec<u8>, AudioStorageError>;

    /// 获取文件信息
    async fn stat_audio(&self, file_name: &str) -> Result<StoredAudio, AudioStorageError>;

    /// 删除音频
    async fn delete_audio(&self, file_name: &str) -> Result<(), AudioStorageError>;

    /// 列出输出目录中的所有音频，按文件名排序
    async fn list_audio(&self) -> Result<Vec<StoredAudio>, AudioStorageError>;
}
