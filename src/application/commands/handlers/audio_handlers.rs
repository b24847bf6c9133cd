//! Audio Command Handlers

use std::sync::Arc;

use crate::application::commands::DeleteAudio;
use crate::application::error::ApplicationError;
use crate::application::ports::AudioStoragePort;

/// DeleteAudio Handler
pub struct DeleteAudioHandler {
    storage: Arc<dyn AudioStoragePort>,
}

impl DeleteAudioHandler {
    pub fn new(storage: Arc<dyn AudioStoragePort>) -> Self {
        Self { storage }
    }

    pub async fn handle(&self, command: DeleteAudio) -> Result<(), ApplicationError> {
        self.storage.delete_audio(&command.file_name).await?;
        tracing::info!(file = %command.file_name, "Audio deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::chapter_handlers::test_support::MemoryStorage;
    use super::*;

    #[tokio::test]
    async fn test_delete_audio() {
        let storage = Arc::new(MemoryStorage::default());
        storage.save_audio("chapter_0.mp3", b"x").await.unwrap();

        DeleteAudioHandler::new(storage.clone())
            .handle(DeleteAudio {
                file_name: "chapter_0.mp3".to_string(),
            })
            .await
            .unwrap();

        assert!(storage.get("chapter_0.mp3").is_none());
    }
}
