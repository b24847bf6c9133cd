//! HTTP Handlers

mod audio;
mod chapter;
mod merge;
mod ping;

pub use audio::*;
pub use chapter::*;
pub use merge::*;
pub use ping::*;
