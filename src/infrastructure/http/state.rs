//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    ChapterPreparer, DeleteAudioHandler, ExtractChaptersHandler, ListChaptersHandler,
    MergeUploadsHandler, SynthesisSettings, SynthesizeChaptersHandler,
    // Query handlers
    GetAudioHandler, ListAudioHandler,
    // Ports
    AudioJoinerPort, AudioStoragePort, TtsEnginePort,
};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub tts_engine: Arc<dyn TtsEnginePort>,
    pub joiner: Arc<dyn AudioJoinerPort>,

    // ========== Command Handlers ==========
    pub list_chapters_handler: ListChaptersHandler,
    pub extract_chapters_handler: ExtractChaptersHandler,
    pub synthesize_chapters_handler: SynthesizeChaptersHandler,
    pub merge_uploads_handler: MergeUploadsHandler,
    pub delete_audio_handler: DeleteAudioHandler,

    // ========== Query Handlers ==========
    pub get_audio_handler: GetAudioHandler,
    pub list_audio_handler: ListAudioHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        tts_engine: Arc<dyn TtsEnginePort>,
        joiner: Arc<dyn AudioJoinerPort>,
        storage: Arc<dyn AudioStoragePort>,
        preparer: ChapterPreparer,
        settings: SynthesisSettings,
    ) -> Self {
        let output_format = settings.output_format;

        Self {
            // Ports
            tts_engine: tts_engine.clone(),
            joiner: joiner.clone(),

            // Command handlers
            list_chapters_handler: ListChaptersHandler::new(),
            extract_chapters_handler: ExtractChaptersHandler::new(preparer.clone()),
            synthesize_chapters_handler: SynthesizeChaptersHandler::new(
                preparer,
                tts_engine,
                joiner.clone(),
                storage.clone(),
                settings,
            ),
            merge_uploads_handler: MergeUploadsHandler::new(joiner, storage.clone(), output_format),
            delete_audio_handler: DeleteAudioHandler::new(storage.clone()),

            // Query handlers
            get_audio_handler: GetAudioHandler::new(storage.clone()),
            list_audio_handler: ListAudioHandler::new(storage),
        }
    }
}
