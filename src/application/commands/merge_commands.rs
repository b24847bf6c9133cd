//! Merge Commands

/// 用户上传的音频文件
#[derive(Debug, Clone)]
pub struct UploadedAudio {
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

/// 按上传顺序合并音频
#[derive(Debug, Clone)]
pub struct MergeUploads {
    pub files: Vec<UploadedAudio>,
}
