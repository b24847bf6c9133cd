//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod joiner;
pub mod storage;
pub mod tts;

pub use joiner::*;
pub use storage::*;
pub use tts::*;
