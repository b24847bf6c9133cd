//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_joiner;
mod audio_storage;
mod tts_engine;

pub use audio_joiner::{
    AudioClip, AudioFormat, AudioJoinerPort, JoinError, JoinStrategy, JoinedAudio,
};
pub use audio_storage::{validate_file_name, AudioStorageError, AudioStoragePort, StoredAudio};
pub use tts_engine::{
    AudioEncoding, SsmlGender, SynthesizeRequest, SynthesizeResponse, TtsEnginePort, TtsError,
    VoiceConfig,
};
