//! Data Transfer Objects

use serde::Serialize;

use crate::application::{GeneratedAudio, SkipReason, SkippedChapter, StoredAudio};
use crate::domain::{SectionSummary, TextChunk};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Chapter DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ChapterListResponse {
    pub total: usize,
    pub chapters: Vec<SectionSummary>,
}

#[derive(Debug, Serialize)]
pub struct SkippedChapterResponse {
    pub index: usize,
    pub reason: &'static str,
    /// 文档中的 section 总数（仅越界时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<usize>,
}

impl From<SkippedChapter> for SkippedChapterResponse {
    fn from(skipped: SkippedChapter) -> Self {
        let available = match skipped.reason {
            SkipReason::OutOfRange { available } => Some(available),
            SkipReason::NoText => None,
        };
        Self {
            index: skipped.index,
            reason: skipped.reason.as_str(),
            available,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterChunksResponse {
    pub index: usize,
    pub chunk_count: usize,
    pub total_bytes: usize,
    pub chunks: Vec<TextChunk>,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub first: usize,
    pub last: usize,
    pub chapters: Vec<ChapterChunksResponse>,
    pub skipped: Vec<SkippedChapterResponse>,
}

// ============================================================================
// Audio DTOs
// ============================================================================

/// 音频下载地址
pub fn audio_url(file_name: &str) -> String {
    format!("/api/audio/{}", file_name)
}

#[derive(Debug, Serialize)]
pub struct GeneratedAudioResponse {
    pub file_name: String,
    pub url: String,
    /// 包含的章节（合并上传时为空）
    pub chapters: Vec<usize>,
    pub clip_count: usize,
    pub duration_ms: u64,
    pub size_bytes: u64,
}

impl From<GeneratedAudio> for GeneratedAudioResponse {
    fn from(audio: GeneratedAudio) -> Self {
        Self {
            url: audio_url(&audio.file_name),
            file_name: audio.file_name,
            chapters: audio.chapters,
            clip_count: audio.clip_count,
            duration_ms: audio.duration_ms,
            size_bytes: audio.size_bytes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SynthesizeResponse {
    pub files: Vec<GeneratedAudioResponse>,
    pub skipped: Vec<SkippedChapterResponse>,
}

#[derive(Debug, Serialize)]
pub struct AudioFileResponse {
    pub file_name: String,
    pub url: String,
    pub size_bytes: u64,
    pub modified_at: Option<String>,
}

impl From<StoredAudio> for AudioFileResponse {
    fn from(stored: StoredAudio) -> Self {
        Self {
            url: audio_url(&stored.file_name),
            file_name: stored.file_name,
            size_bytes: stored.size_bytes,
            modified_at: stored.modified_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AudioListResponse {
    pub total: usize,
    pub files: Vec<AudioFileResponse>,
}
