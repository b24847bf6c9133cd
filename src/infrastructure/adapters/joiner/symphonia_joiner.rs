//! In-process Joiner - 进程内拼接
//!
//! 以第一个片段的采样率和声道数为目标：
//! - MP3 输出：流参数全部一致时按顺序追加完整帧，否则解码、转换后用 LAME 重新编码
//! - WAV 输出：解码、转换为 PCM 后拼接，编码为 16 位 WAV

use async_trait::async_trait;

use super::codec::{self, StreamInfo};
use crate::application::ports::{
    AudioClip, AudioFormat, AudioJoinerPort, JoinError, JoinStrategy, JoinedAudio,
};

/// 基于 symphonia 的进程内拼接器
#[derive(Debug, Default, Clone)]
pub struct SymphoniaJoiner;

impl SymphoniaJoiner {
    pub fn new() -> Self {
        Self
    }

    /// 解码所有片段并转换为 `target`，返回交错 PCM
    fn decode_all(
        clips: &[AudioClip],
        target: Option<StreamInfo>,
    ) -> Result<(Vec<f32>, StreamInfo), JoinError> {
        let mut target = target;
        let mut pcm: Vec<f32> = Vec::new();

        for clip in clips {
            let decoded = codec::decode(&clip.data, clip.index)?;
            let info = *target.get_or_insert(decoded.info);
            if decoded.info != info {
                tracing::debug!(
                    clip = clip.index,
                    from = %decoded.info,
                    to = %info,
                    "Converting clip"
                );
            }
            pcm.extend(codec::convert(&decoded, info)?);
        }

        let info = target.ok_or(JoinError::Empty)?;
        Ok((pcm, info))
    }

    fn frames(pcm: &[f32], info: StreamInfo) -> u64 {
        pcm.len() as u64 / info.channels.max(1) as u64
    }

    fn join_mp3(clips: &[AudioClip]) -> Result<(Vec<u8>, u64, u32), JoinError> {
        let demuxed = clips
            .iter()
            .map(|clip| codec::demux_mp3(&clip.data, clip.index))
            .collect::<Result<Vec<_>, _>>()?;
        let target = demuxed.first().map(|f| f.info).ok_or(JoinError::Empty)?;

        if demuxed.iter().all(|frames| frames.info == target) {
            let samples = demuxed.iter().map(|frames| frames.samples).sum();
            let data = demuxed.into_iter().flat_map(|frames| frames.payload).collect();
            return Ok((data, samples, target.sample_rate));
        }

        let (pcm, info) = Self::decode_all(clips, Some(target))?;
        let data = codec::encode_mp3(info, &pcm)?;
        Ok((data, Self::frames(&pcm, info), info.sample_rate))
    }

    fn join_wav(clips: &[AudioClip]) -> Result<(Vec<u8>, u64, u32), JoinError> {
        let (pcm, info) = Self::decode_all(clips, None)?;
        let samples = Self::frames(&pcm, info);
        Ok((codec::encode_wav(info, &pcm), samples, info.sample_rate))
    }
}

#[async_trait]
impl AudioJoinerPort for SymphoniaJoiner {
    async fn join(&self, clips: &[AudioClip], format: AudioFormat) -> Result<JoinedAudio, JoinError> {
        if clips.is_empty() {
            return Err(JoinError::Empty);
        }

        let owned = clips.to_vec();
        let (data, samples, sample_rate) = tokio::task::spawn_blocking(move || match format {
            AudioFormat::Mp3 => Self::join_mp3(&owned),
            AudioFormat::Wav => Self::join_wav(&owned),
        })
        .await
        .map_err(|e| JoinError::DecodingError(format!("join task failed: {}", e)))??;

        let duration_ms = codec::samples_to_ms(samples, sample_rate);

        tracing::debug!(
            clips = clips.len(),
            format = %format,
            bytes = data.len(),
            duration_ms,
            "Clips joined in process"
        );

        Ok(JoinedAudio {
            data,
            format,
            duration_ms,
            clip_count: clips.len(),
        })
    }

    fn strategy(&self) -> JoinStrategy {
        JoinStrategy::InProcess
    }
}

#[cfg(test)]
mod tests {
    use super::super::codec::fixtures::*;
    use super::*;

    fn clips(data: Vec<Vec<u8>>) -> Vec<AudioClip> {
        data.into_iter()
            .enumerate()
            .map(|(i, d)| AudioClip::new(i, d))
            .collect()
    }

    #[tokio::test]
    async fn test_join_mp3_keeps_order() {
        let a = mp3_clip(2, true, 1);
        let b = mp3_clip(3, true, 2);
        let joiner = SymphoniaJoiner::new();

        let ab = joiner
            .join(&clips(vec![a.clone(), b.clone()]), AudioFormat::Mp3)
            .await
            .unwrap();
        let ba = joiner
            .join(&clips(vec![b.clone(), a.clone()]), AudioFormat::Mp3)
            .await
            .unwrap();

        assert_eq!(ab.data, [a.as_slice(), b.as_slice()].concat());
        assert_ne!(ab.data, ba.data);
        assert_eq!(ab.clip_count, 2);
        assert_eq!(ab.format, AudioFormat::Mp3);
    }

    #[tokio::test]
    async fn test_joined_duration_is_sum() {
        let joiner = SymphoniaJoiner::new();
        let joined = joiner
            .join(
                &clips(vec![mp3_clip(10, true, 0), mp3_clip(28, true, 0)]),
                AudioFormat::Mp3,
            )
            .await
            .unwrap();
        // 38 * 1152 / 44100 s
        assert_eq!(joined.duration_ms, 38 * MP3_FRAME_SAMPLES * 1000 / 44100);
    }

    #[tokio::test]
    async fn test_single_clip_is_unchanged() {
        let a = mp3_clip(4, false, 9);
        let joined = SymphoniaJoiner::new()
            .join(&clips(vec![a.clone()]), AudioFormat::Mp3)
            .await
            .unwrap();
        assert_eq!(joined.data, a);
    }

    #[tokio::test]
    async fn test_mismatched_channels_are_converted() {
        let joined = SymphoniaJoiner::new()
            .join(
                &clips(vec![mp3_clip(5, true, 0), mp3_clip(5, false, 0)]),
                AudioFormat::Mp3,
            )
            .await
            .unwrap();

        let expected = codec::samples_to_ms(5 * MP3_FRAME_SAMPLES, 44100) * 2;
        assert!(joined.duration_ms.abs_diff(expected) <= 1);
        assert_eq!(joined.clip_count, 2);

        let info = codec::read_stream_info(&joined.data, 0).unwrap();
        assert_eq!(
            info,
            StreamInfo {
                sample_rate: 44100,
                channels: 2
            }
        );
    }

    #[tokio::test]
    async fn test_mismatched_rates_are_resampled() {
        let joined = SymphoniaJoiner::new()
            .join(
                &clips(vec![mp3_clip(10, false, 0), mp3_clip_48k(10, false, 0)]),
                AudioFormat::Mp3,
            )
            .await
            .unwrap();

        let first = codec::samples_to_ms(10 * MP3_FRAME_SAMPLES, 44100);
        let second = codec::samples_to_ms(10 * MP3_FRAME_SAMPLES, 48000);
        assert!(joined.duration_ms.abs_diff(first + second) <= 1);
        assert_eq!(codec::read_stream_info(&joined.data, 0).unwrap().sample_rate, 44100);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let err = SymphoniaJoiner::new()
            .join(&[], AudioFormat::Mp3)
            .await
            .unwrap_err();
        assert!(matches!(err, JoinError::Empty));
    }

    #[tokio::test]
    async fn test_invalid_clip_reports_index() {
        let err = SymphoniaJoiner::new()
            .join(
                &clips(vec![mp3_clip(2, true, 0), b"garbage".to_vec()]),
                AudioFormat::Mp3,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, JoinError::InvalidInput { index: 1, .. }));
    }

    #[tokio::test]
    async fn test_join_wav_output() {
        let joined = SymphoniaJoiner::new()
            .join(
                &clips(vec![wav_clip(8000, 800), wav_clip(8000, 1600)]),
                AudioFormat::Wav,
            )
            .await
            .unwrap();

        assert_eq!(&joined.data[0..4], b"RIFF");
        assert_eq!(joined.duration_ms, 300);
        // 44 字节头 + 2400 个 16 位样本
        assert_eq!(joined.data.len(), 44 + 2400 * 2);
    }

    #[tokio::test]
    async fn test_join_wav_converts_mixed_rates() {
        let joined = SymphoniaJoiner::new()
            .join(
                &clips(vec![wav_clip(8000, 800), wav_clip(16000, 1600)]),
                AudioFormat::Wav,
            )
            .await
            .unwrap();

        // 第二段重采样到 8 kHz 后为 800 帧
        assert_eq!(joined.duration_ms, 200);
        assert_eq!(joined.data.len(), 44 + 1600 * 2);
        assert_eq!(
            u32::from_le_bytes([joined.data[24], joined.data[25], joined.data[26], joined.data[27]]),
            8000
        );
    }
}
