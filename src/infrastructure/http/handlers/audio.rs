//! Audio Handlers - 输出目录中的音频

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::{DeleteAudio, GetAudioQuery, ListAudioQuery};
use crate::infrastructure::http::dto::{ApiResponse, AudioFileResponse, AudioListResponse, Empty};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct DownloadParams {
    /// 为 true 时以附件形式返回
    #[serde(default)]
    pub download: bool,
}

/// 列出已生成的音频
pub async fn list_audio(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<AudioListResponse>>, ApiError> {
    let files: Vec<AudioFileResponse> = state
        .list_audio_handler
        .handle(ListAudioQuery)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ApiResponse::success(AudioListResponse {
        total: files.len(),
        files,
    })))
}

/// 播放/下载音频（流式返回）
pub async fn get_audio(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, ApiError> {
    let audio = state
        .get_audio_handler
        .handle(GetAudioQuery { file_name })
        .await?;

    let file = tokio::fs::File::open(&audio.path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to open audio file: {}", e)))?;

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    let disposition = if params.download {
        format!("attachment; filename=\"{}\"", audio.file_name)
    } else {
        format!("inline; filename=\"{}\"", audio.file_name)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, audio.content_type)
        .header(header::CONTENT_LENGTH, audio.size_bytes)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

/// 删除音频
pub async fn delete_audio(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_audio_handler
        .handle(DeleteAudio { file_name })
        .await?;

    Ok(Json(ApiResponse::ok()))
}
