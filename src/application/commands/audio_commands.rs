//! Audio Commands

/// 从输出目录删除音频文件
#[derive(Debug, Clone)]
pub struct DeleteAudio {
    pub file_name: String,
}
