//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TtsEngine、AudioJoiner、AudioStorage）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Audio commands
    DeleteAudio,
    // Chapter commands
    ExtractChapters,
    ListChapters,
    OutputMode,
    SynthesizeChapters,
    // Merge commands
    MergeUploads,
    UploadedAudio,
    // Handlers
    handlers::{
        ChapterPreparer, DeleteAudioHandler, ExtractChaptersHandler, GeneratedAudio, ListChaptersHandler,
        MergeUploadsHandler, PreparedChapters, SkipReason, SkippedChapter, SynthesisSettings,
        SynthesizeChaptersHandler, SynthesizeChaptersResponse,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Audio joiner
    AudioClip,
    AudioFormat,
    AudioJoinerPort,
    JoinError,
    JoinStrategy,
    JoinedAudio,
    // Audio storage
    AudioStorageError,
    AudioStoragePort,
    StoredAudio,
    // TTS engine
    AudioEncoding,
    SsmlGender,
    SynthesizeRequest,
    SynthesizeResponse,
    TtsEnginePort,
    TtsError,
    VoiceConfig,
};

pub use queries::{
    handlers::{GetAudioHandler, ListAudioHandler},
    GetAudioQuery, GetAudioResponse, ListAudioQuery,
};
