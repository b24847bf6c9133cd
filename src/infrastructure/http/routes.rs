//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                   GET     健康检查
//! - /api/chapter/list           POST    列出章节（multipart: file）
//! - /api/chapter/extract        POST    提取并分块（multipart: file, first, last, max_chunk_bytes）
//! - /api/chapter/synthesize     POST    合成章节音频（multipart: file, first, last, mode）
//! - /api/merge                  POST    合并上传的音频（multipart: files...）
//! - /api/audio/list             GET     列出已生成的音频
//! - /api/audio/:file_name       GET     播放/下载（?download=true 作为附件）
//! - /api/audio/:file_name       DELETE  删除音频

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/chapter", chapter_routes())
        .route("/merge", post(handlers::merge_audio))
        .nest("/audio", audio_routes())
}

/// Chapter 路由
fn chapter_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/list", post(handlers::list_chapters))
        .route("/extract", post(handlers::extract_chapters))
        .route("/synthesize", post(handlers::synthesize_chapters))
}

/// Audio 路由
fn audio_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/list", get(handlers::list_audio))
        .route(
            "/:file_name",
            get(handlers::get_audio).delete(handlers::delete_audio),
        )
}
