//! Chapter Commands

use serde::Deserialize;

use crate::domain::ChapterRange;

/// 列出文档中的章节
#[derive(Debug, Clone)]
pub struct ListChapters {
    pub content: Vec<u8>,
}

/// 提取章节并分块（不合成）
#[derive(Debug, Clone)]
pub struct ExtractChapters {
    /// 上传的 XML 文档
    pub content: Vec<u8>,
    pub range: ChapterRange,
    /// 覆盖默认的分块字节上限
    pub max_chunk_bytes: Option<usize>,
}

/// 输出方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// 每章一个文件
    #[default]
    PerChapter,
    /// 整个范围合并为一个文件
    Combined,
}

impl std::str::FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per_chapter" => Ok(OutputMode::PerChapter),
            "combined" => Ok(OutputMode::Combined),
            _ => Err(format!("Unknown output mode: {}", s)),
        }
    }
}

/// 提取、分块、合成并拼接章节音频
#[derive(Debug, Clone)]
pub struct SynthesizeChapters {
    pub content: Vec<u8>,
    pub range: ChapterRange,
    pub mode: OutputMode,
}
