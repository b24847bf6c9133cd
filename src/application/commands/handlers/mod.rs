//! Command Handlers 实现

mod audio_handlers;
mod chapter_handlers;
mod merge_handlers;

pub use audio_handlers::DeleteAudioHandler;
pub use chapter_handlers::{
    ChapterChunks, ChapterPreparer, ExtractChaptersHandler, GeneratedAudio, ListChaptersHandler,
    PreparedChapters, SkipReason, SkippedChapter, SynthesisSettings, SynthesizeChaptersHandler,
    SynthesizeChaptersResponse,
};
pub use merge_handlers::{MergeUploadsHandler, MIN_MERGE_FILES};

#[cfg(test)]
pub(crate) use chapter_handlers::test_support;
