//! Chapter HTTP Handlers

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;

use crate::application::{ExtractChapters, ListChapters, OutputMode, SynthesizeChapters};
use crate::domain::ChapterRange;
use crate::infrastructure::http::dto::{
    ApiResponse, ChapterChunksResponse, ChapterListResponse, ExtractResponse,
    GeneratedAudioResponse, SynthesizeResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Multipart form
// ============================================================================

/// 章节相关接口共用的表单
#[derive(Debug, Default)]
struct ChapterForm {
    content: Option<Vec<u8>>,
    first: Option<usize>,
    last: Option<usize>,
    max_chunk_bytes: Option<usize>,
    mode: Option<OutputMode>,
}

impl ChapterForm {
    fn content(&mut self) -> Result<Vec<u8>, ApiError> {
        self.content
            .take()
            .ok_or_else(|| ApiError::BadRequest("Missing file".to_string()))
    }

    /// `first` 必填；`last` 缺省时等于 `first`
    fn range(&self) -> Result<ChapterRange, ApiError> {
        let first = self
            .first
            .ok_or_else(|| ApiError::BadRequest("Missing first chapter number".to_string()))?;
        Ok(ChapterRange::new(first, self.last.unwrap_or(first)))
    }
}

fn parse_number(name: &str, value: &str) -> Result<usize, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{} must be a non-negative integer", name)))
}

async fn read_chapter_form(mut multipart: Multipart) -> Result<ChapterForm, ApiError> {
    let mut form = ChapterForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                if bytes.is_empty() {
                    return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
                }
                form.content = Some(bytes.to_vec());
            }
            "first" | "last" | "max_chunk_bytes" | "mode" => {
                let value = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read {}: {}", field_name, e))
                })?;
                match field_name.as_str() {
                    "first" => form.first = Some(parse_number("first", &value)?),
                    "last" => form.last = Some(parse_number("last", &value)?),
                    "max_chunk_bytes" => {
                        form.max_chunk_bytes = Some(parse_number("max_chunk_bytes", &value)?)
                    }
                    _ => {
                        form.mode = Some(value.trim().parse().map_err(ApiError::BadRequest)?)
                    }
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

// ============================================================================
// Handlers
// ============================================================================

/// 列出上传文档中的所有章节
pub async fn list_chapters(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ChapterListResponse>>, ApiError> {
    let mut form = read_chapter_form(multipart).await?;

    let chapters = state.list_chapters_handler.handle(ListChapters {
        content: form.content()?,
    })?;

    Ok(Json(ApiResponse::success(ChapterListResponse {
        total: chapters.len(),
        chapters,
    })))
}

/// 提取章节并返回分块结果（不合成）
pub async fn extract_chapters(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ExtractResponse>>, ApiError> {
    let mut form = read_chapter_form(multipart).await?;
    let range = form.range()?;

    let prepared = state
        .extract_chapters_handler
        .handle(ExtractChapters {
            content: form.content()?,
            range,
            max_chunk_bytes: form.max_chunk_bytes,
        })?;

    let chapters = prepared
        .chapters
        .into_iter()
        .map(|chapter| ChapterChunksResponse {
            index: chapter.index,
            chunk_count: chapter.chunks.len(),
            total_bytes: chapter.chunks.iter().map(|c| c.byte_len).sum(),
            chunks: chapter.chunks,
        })
        .collect();

    Ok(Json(ApiResponse::success(ExtractResponse {
        first: range.first(),
        last: range.last(),
        chapters,
        skipped: prepared.skipped.into_iter().map(Into::into).collect(),
    })))
}

/// 合成章节音频
pub async fn synthesize_chapters(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<SynthesizeResponse>>, ApiError> {
    let mut form = read_chapter_form(multipart).await?;
    let range = form.range()?;

    let response = state
        .synthesize_chapters_handler
        .handle(SynthesizeChapters {
            content: form.content()?,
            range,
            mode: form.mode.unwrap_or_default(),
        })
        .await?;

    Ok(Json(ApiResponse::success(SynthesizeResponse {
        files: response
            .files
            .into_iter()
            .map(GeneratedAudioResponse::from)
            .collect(),
        skipped: response.skipped.into_iter().map(Into::into).collect(),
    })))
}
