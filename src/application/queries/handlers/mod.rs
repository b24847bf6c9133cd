//! Query Handlers 实现

mod audio_handlers;

pub use audio_handlers::*;
