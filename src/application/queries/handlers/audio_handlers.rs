//! Audio Query Handlers

use std::path::Path;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{AudioFormat, AudioStoragePort, StoredAudio};
use crate::application::queries::audio_queries::{GetAudioQuery, GetAudioResponse, ListAudioQuery};

/// 根据扩展名推断 Content-Type
fn content_type_for(file_name: &str) -> &'static str {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse::<AudioFormat>().ok())
        .map(|format| format.content_type())
        .unwrap_or("application/octet-stream")
}

/// GetAudio Handler - 定位音频文件
pub struct GetAudioHandler {
    storage: Arc<dyn AudioStoragePort>,
}

impl GetAudioHandler {
    pub fn new(storage: Arc<dyn AudioStoragePort>) -> Self {
        Self { storage }
    }

    pub async fn handle(&self, query: GetAudioQuery) -> Result<GetAudioResponse, ApplicationError> {
        let stored = self.storage.stat_audio(&query.file_name).await?;

        Ok(GetAudioResponse {
            content_type: content_type_for(&stored.file_name),
            file_name: stored.file_name,
            path: stored.path,
            size_bytes: stored.size_bytes,
        })
    }
}

/// ListAudio Handler
pub struct ListAudioHandler {
    storage: Arc<dyn AudioStoragePort>,
}

impl ListAudioHandler {
    pub fn new(storage: Arc<dyn AudioStoragePort>) -> Self {
        Self { storage }
    }

    pub async fn handle(&self, _query: ListAudioQuery) -> Result<Vec<StoredAudio>, ApplicationError> {
        Ok(self.storage.list_audio().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::test_support::MemoryStorage;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("chapter_1.mp3"), "audio/mpeg");
        assert_eq!(content_type_for("merged.WAV"), "audio/wav");
        assert_eq!(content_type_for("notes.txt"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_get_audio_not_found() {
        let handler = GetAudioHandler::new(Arc::new(MemoryStorage::default()));
        let result = handler
            .handle(GetAudioQuery {
                file_name: "missing.mp3".to_string(),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_and_get_audio() {
        let storage = Arc::new(MemoryStorage::default());
        storage.save_audio("b.mp3", b"bb").await.unwrap();
        storage.save_audio("a.wav", b"a").await.unwrap();

        let listed = ListAudioHandler::new(storage.clone())
            .handle(ListAudioQuery)
            .await
            .unwrap();
        let names: Vec<&str> = listed.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.wav", "b.mp3"]);

        let audio = GetAudioHandler::new(storage)
            .handle(GetAudioQuery {
                file_name: "b.mp3".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(audio.size_bytes, 2);
        assert_eq!(audio.content_type, "audio/mpeg");
    }
}
