//! Audio Joiner Adapter - 音频拼接实现

mod codec;
mod ffmpeg_joiner;
mod symphonia_joiner;

use std::path::PathBuf;
use std::sync::Arc;

pub use codec::{read_stream_info, StreamInfo};
pub use ffmpeg_joiner::FfmpegJoiner;
pub use symphonia_joiner::SymphoniaJoiner;

use crate::application::ports::{AudioJoinerPort, JoinStrategy};

/// 按策略创建拼接器
pub fn build_joiner(strategy: JoinStrategy, ffmpeg_path: impl Into<PathBuf>) -> Arc<dyn AudioJoinerPort> {
    match strategy {
        JoinStrategy::InProcess => Arc::new(SymphoniaJoiner::new()),
        JoinStrategy::Ffmpeg => Arc::new(FfmpegJoiner::new(ffmpeg_path)),
    }
}

#[cfg(test)]
pub(crate) use codec::fixtures;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_joiner() {
        assert_eq!(
            build_joiner(JoinStrategy::InProcess, "ffmpeg").strategy(),
            JoinStrategy::InProcess
        );
        assert_eq!(
            build_joiner(JoinStrategy::Ffmpeg, "/usr/bin/ffmpeg").strategy(),
            JoinStrategy::Ffmpeg
        );
    }
}
