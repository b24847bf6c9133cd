//! Chaptercast - 电子书章节转有声书
//!
//! 架构设计: CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - chapter: 从 FictionBook 风格的 XML 中按序号提取章节
//! - cleaner: 有序替换表文本清洗
//! - chunker: 按 UTF-8 字节上限分块
//!
//! 应用层 (application/):
//! - Ports: 端口定义（TtsEngine, AudioJoiner, AudioStorage）
//! - Commands: 章节提取、合成、上传合并、删除
//! - Queries: 输出目录中的音频查询
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API（multipart 上传，流式下载）
//! - Adapters: Google TTS Client, Fake TTS, Symphonia/ffmpeg 拼接器, 文件存储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
