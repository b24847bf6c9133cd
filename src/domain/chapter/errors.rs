//! Chapter Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("XML 解析失败 (位置 {position}): {message}")]
    Malformed { position: u64, message: String },

    #[error("文本解码失败: {0}")]
    Encoding(String),
}
