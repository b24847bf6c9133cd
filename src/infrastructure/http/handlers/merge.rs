//! Merge HTTP Handler

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;

use crate::application::{MergeUploads, UploadedAudio};
use crate::infrastructure::http::dto::{ApiResponse, GeneratedAudioResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 合并上传的音频文件
///
/// 所有名为 `files` 的字段按上传顺序拼接
pub async fn merge_audio(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<GeneratedAudioResponse>>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        if field.name() != Some("files") {
            continue;
        }

        let file_name = field.file_name().map(|s| s.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;

        files.push(UploadedAudio {
            file_name,
            data: data.to_vec(),
        });
    }

    tracing::info!(files = files.len(), "Merge requested");

    let merged = state
        .merge_uploads_handler
        .handle(MergeUploads { files })
        .await?;

    Ok(Json(ApiResponse::success(merged.into())))
}
