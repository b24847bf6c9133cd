//! Storage Adapter - 输出目录

mod file_storage;

pub use file_storage::FileAudioStorage;
