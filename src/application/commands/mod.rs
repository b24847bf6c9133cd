//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：章节提取、合成与音频合并

mod audio_commands;
mod chapter_commands;
mod merge_commands;

pub mod handlers;

pub use audio_commands::*;
pub use chapter_commands::*;
pub use merge_commands::*;
