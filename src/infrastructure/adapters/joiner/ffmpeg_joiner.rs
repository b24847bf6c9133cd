//! FFmpeg Joiner - 外部工具拼接
//!
//! 片段写入临时目录，生成 concat 清单后调用 ffmpeg。
//! 临时目录在返回前（包括出错时）删除。

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::codec;
use crate::application::ports::{
    AudioClip, AudioFormat, AudioJoinerPort, JoinError, JoinStrategy, JoinedAudio,
};

const MANIFEST_NAME: &str = "list.txt";

/// ffmpeg concat 拼接器
#[derive(Debug, Clone)]
pub struct FfmpegJoiner {
    ffmpeg_path: PathBuf,
}

impl FfmpegJoiner {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// concat demuxer 清单，每行一个 `file '<path>'`
    pub fn manifest(paths: &[PathBuf]) -> String {
        paths
            .iter()
            .map(|p| {
                // 单引号需要转义为 '\''
                let escaped = p.to_string_lossy().replace('\'', r"'\''");
                format!("file '{}'\n", escaped)
            })
            .collect()
    }

    fn codec_args(format: AudioFormat) -> [&'static str; 2] {
        match format {
            AudioFormat::Mp3 => ["-c", "copy"],
            AudioFormat::Wav => ["-c:a", "pcm_s16le"],
        }
    }

    async fn run(&self, dir: &Path, clips: &[AudioClip], format: AudioFormat) -> Result<Vec<u8>, JoinError> {
        let mut inputs = Vec::with_capacity(clips.len());
        for (position, clip) in clips.iter().enumerate() {
            if clip.data.is_empty() {
                return Err(JoinError::InvalidInput {
                    index: clip.index,
                    message: "empty audio".to_string(),
                });
            }
            let path = dir.join(format!("{}.mp3", position));
            tokio::fs::write(&path, &clip.data).await?;
            inputs.push(path);
        }

        let manifest_path = dir.join(MANIFEST_NAME);
        tokio::fs::write(&manifest_path, Self::manifest(&inputs)).await?;

        let output_path = dir.join(format!("out.{}", format.extension()));

        let output = Command::new(&self.ffmpeg_path)
            .arg("-hide_banner")
            .args(["-loglevel", "error"])
            .arg("-y")
            .args(["-f", "concat", "-safe", "0", "-i"])
            .arg(&manifest_path)
            .args(Self::codec_args(format))
            .arg(&output_path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                JoinError::External(format!(
                    "failed to run {}: {}",
                    self.ffmpeg_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(JoinError::External(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(tokio::fs::read(&output_path).await?)
    }

    fn duration_ms(data: &[u8], format: AudioFormat) -> u64 {
        let result = match format {
            AudioFormat::Mp3 => codec::demux_mp3(data, 0)
                .map(|f| codec::samples_to_ms(f.samples, f.info.sample_rate)),
            AudioFormat::Wav => {
                codec::decode(data, 0).map(|d| codec::samples_to_ms(d.frames(), d.info.sample_rate))
            }
        };
        match result {
            Ok(ms) => ms,
            Err(e) => {
                tracing::warn!(error = %e, "Could not measure joined audio");
                0
            }
        }
    }
}

impl Default for FfmpegJoiner {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl AudioJoinerPort for FfmpegJoiner {
    async fn join(&self, clips: &[AudioClip], format: AudioFormat) -> Result<JoinedAudio, JoinError> {
        if clips.is_empty() {
            return Err(JoinError::Empty);
        }

        let dir = tempfile::Builder::new().prefix("chaptercast-").tempdir()?;
        let result = self.run(dir.path(), clips, format).await;

        if let Err(e) = dir.close() {
            tracing::warn!(error = %e, "Failed to remove temporary directory");
        }

        let data = result?;
        let duration_ms = Self::duration_ms(&data, format);

        tracing::debug!(
            clips = clips.len(),
            format = %format,
            bytes = data.len(),
            duration_ms,
            "Clips joined with ffmpeg"
        );

        Ok(JoinedAudio {
            data,
            format,
            duration_ms,
            clip_count: clips.len(),
        })
    }

    fn strategy(&self) -> JoinStrategy {
        JoinStrategy::Ffmpeg
    }
}
