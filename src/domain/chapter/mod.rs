//! Chapter Context
//!
//! 从 XML 电子书中按 section 切分章节

mod errors;
mod extractor;
mod value_objects;

pub use errors::ExtractError;
pub use extractor::{extract_chapter, extract_chapters, list_sections};
pub use value_objects::{ChapterRange, ChapterText, SectionSummary};
