//! Audio Queries - 输出目录中的音频文件

use std::path::PathBuf;

/// 获取单个音频文件（用于下载/播放）
#[derive(Debug, Clone)]
pub struct GetAudioQuery {
    pub file_name: String,
}

/// 获取音频响应
#[derive(Debug, Clone)]
pub struct GetAudioResponse {
    pub file_name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub content_type: &'static str,
}

/// 列出所有已生成的音频
#[derive(Debug, Clone, Default)]
pub struct ListAudioQuery;
