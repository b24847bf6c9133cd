//! Merge Command Handlers

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::GeneratedAudio;
use crate::application::commands::MergeUploads;
use crate::application::error::ApplicationError;
use crate::application::ports::{AudioClip, AudioFormat, AudioJoinerPort, AudioStoragePort};

/// 合并至少需要的文件数
pub const MIN_MERGE_FILES: usize = 2;

/// MergeUploads Handler - 按上传顺序拼接音频文件
pub struct MergeUploadsHandler {
    joiner: Arc<dyn AudioJoinerPort>,
    storage: Arc<dyn AudioStoragePort>,
    output_format: AudioFormat,
}

impl MergeUploadsHandler {
    pub fn new(
        joiner: Arc<dyn AudioJoinerPort>,
        storage: Arc<dyn AudioStoragePort>,
        output_format: AudioFormat,
    ) -> Self {
        Self {
            joiner,
            storage,
            output_format,
        }
    }

    pub async fn handle(&self, command: MergeUploads) -> Result<GeneratedAudio, ApplicationError> {
        if command.files.len() < MIN_MERGE_FILES {
            return Err(ApplicationError::validation(format!(
                "At least {} files are required, got {}",
                MIN_MERGE_FILES,
                command.files.len()
            )));
        }

        let mut clips = Vec::with_capacity(command.files.len());
        for (index, file) in command.files.into_iter().enumerate() {
            if file.data.is_empty() {
                return Err(ApplicationError::validation(format!(
                    "Uploaded file {} ({}) is empty",
                    index,
                    file.file_name.as_deref().unwrap_or("unnamed")
                )));
            }
            clips.push(AudioClip::new(index, file.data));
        }

        let joined = self.joiner.join(&clips, self.output_format).await?;

        let file_name = format!(
            "merged_{}_{}.{}",
            Utc::now().format("%Y%m%d%H%M%S"),
            &Uuid::new_v4().simple().to_string()[..8],
            self.output_format.extension()
        );
        let stored = self.storage.save_audio(&file_name, &joined.data).await?;

        tracing::info!(
            file = %stored.file_name,
            clips = joined.clip_count,
            duration_ms = joined.duration_ms,
            strategy = %self.joiner.strategy(),
            "Uploads merged"
        );

        Ok(GeneratedAudio {
            file_name: stored.file_name,
            chapters: Vec::new(),
            clip_count: joined.clip_count,
            duration_ms: joined.duration_ms,
            size_bytes: stored.size_bytes,
        })
    }
}
