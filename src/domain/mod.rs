//! Domain Layer - 领域层
//!
//! - chapter: 章节提取
//! - cleaner: 有序替换表文本清洗
//! - chunker: 按字节上限分块

pub mod chapter;
pub mod chunker;
pub mod cleaner;

pub use chapter::{
    extract_chapter, extract_chapters, list_sections, ChapterRange, ChapterText, ExtractError,
    SectionSummary,
};
pub use chunker::{chunk_segments, chunk_text, ChunkConfig, TextChunk};
pub use cleaner::{clean_text, RewriteRule, RewriteTable};
