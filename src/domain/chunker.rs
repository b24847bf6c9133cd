//! 文本分块器
//!
//! 按 UTF-8 字节数上限对文本进行贪心分块，单词是最小单位

use serde::Serialize;

/// Google TTS 单次请求的文本字节上限（留出余量）
pub const GOOGLE_TTS_MAX_BYTES: usize = 4970;

/// 早期版本使用的分块上限
pub const LEGACY_MAX_BYTES: usize = 40;

/// 分块配置
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// 每块最大字节数（UTF-8 编码后）
    pub max_bytes: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_bytes: GOOGLE_TTS_MAX_BYTES,
        }
    }
}

/// 文本块 - 最小 TTS 合成单位
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextChunk {
    /// 块在章节内的顺序
    pub index: usize,
    pub content: String,
    /// UTF-8 字节数
    pub byte_len: usize,
}

/// 对文本进行分块
///
/// 分块策略：
/// 1. 按空白切分单词
/// 2. 以单个空格拼接，直到下一个单词会让字节数超过 `max_bytes`
/// 3. 超出时关闭当前块，以溢出的单词开始新块
///
/// 空输入返回空序列，不会产生空块。
/// 单个单词本身超过上限时独占一块（不在单词内部切分）。
pub fn chunk_text(text: &str, max_bytes: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        // 候选块长度 = 当前 + 空格 + 单词
        if current.len() + 1 + word.len() <= max_bytes {
            current.push(' ');
            current.push_str(word);
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// 分块并附带索引和字节数
pub fn chunk_segments(text: &str, config: &ChunkConfig) -> Vec<TextChunk> {
    chunk_text(text, config.max_bytes)
        .into_iter()
        .enumerate()
        .map(|(index, content)| TextChunk {
            index,
            byte_len: content.len(),
            content,
        })
        .collect()
}
