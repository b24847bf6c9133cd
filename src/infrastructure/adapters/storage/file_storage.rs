//! File Storage - 文件系统音频存储实现
//!
//! 实现 AudioStoragePort trait，所有文件平铺在输出目录下

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{
    validate_file_name, AudioStorageError, AudioStoragePort, StoredAudio,
};

fn io_error(e: std::io::Error) -> AudioStorageError {
    AudioStorageError::IoError(e.to_string())
}

/// 文件系统音频存储
pub struct FileAudioStorage {
    /// 输出目录
    base_dir: PathBuf,
}

impl FileAudioStorage {
    /// 创建新的文件存储
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, AudioStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir).await.map_err(io_error)?;

        Ok(Self { base_dir })
    }

    /// 获取输出目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn stored(file_name: String, path: PathBuf, metadata: &std::fs::Metadata) -> StoredAudio {
        StoredAudio {
            file_name,
            path,
            size_bytes: metadata.len(),
            modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
        }
    }
}

#[async_trait]
impl AudioStoragePort for FileAudioStorage {
    fn get_audio_path(&self, file_name: &str) -> Result<PathBuf, AudioStorageError> {
        validate_file_name(file_name)?;
        Ok(self.base_dir.join(file_name))
    }

    async fn save_audio(
        &self,
        file_name: &str,
        data: &[u8],
    ) -> Result<StoredAudio, AudioStorageError> {
        let audio_path = self.get_audio_path(file_name)?;

        fs::write(&audio_path, data).await.map_err(io_error)?;

        tracing::debug!(
            file = %file_name,
            size = data.len(),
            "Saved audio"
        );

        self.stat_audio(file_name).await
    }

    async fn read_audio(&self, file_name: &str) -> Result<Vec<u8>, AudioStorageError> {
        let audio_path = self.get_audio_path(file_name)?;

        if !audio_path.is_file() {
            return Err(AudioStorageError::FileNotFound(file_name.to_string()));
        }

        fs::read(&audio_path).await.map_err(io_error)
    }

    async fn stat_audio(&self, file_name: &str) -> Result<StoredAudio, AudioStorageError> {
        let audio_path = self.get_audio_path(file_name)?;

        let metadata = match fs::metadata(&audio_path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err(AudioStorageError::FileNotFound(file_name.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AudioStorageError::FileNotFound(file_name.to_string()))
            }
            Err(e) => return Err(io_error(e)),
        };

        Ok(Self::stored(file_name.to_string(), audio_path, &metadata))
    }

    async fn delete_audio(&self, file_name: &str) -> Result<(), AudioStorageError> {
        let audio_path = self.get_audio_path(file_name)?;

        match fs::remove_file(&audio_path).await {
            Ok(()) => {
                tracing::debug!(file = %file_name, "Deleted audio");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AudioStorageError::FileNotFound(file_name.to_string()))
            }
            Err(e) => Err(io_error(e)),
        }
    }

    async fn list_audio(&self) -> Result<Vec<StoredAudio>, AudioStorageError> {
        let mut files = Vec::new();

        let mut entries = fs::read_dir(&self.base_dir).await.map_err(io_error)?;

        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            files.push(Self::stored(file_name, entry.path(), &metadata));
        }

        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(files)
    }
}
