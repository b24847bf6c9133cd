//! 基于 symphonia 的解复用/解码，声道与采样率转换，
//! 以及 16 位 PCM WAV 和 LAME MP3 编码

use mp3lame_encoder::{Bitrate, FlushNoGap, InterleavedPcm, MonoPcm, Quality};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_MP3};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::JoinError;

/// 流参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub sample_rate: u32,
    pub channels: u8,
}

impl std::fmt::Display for StreamInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz / {} ch", self.sample_rate, self.channels)
    }
}

/// 解复用得到的 MP3 帧
#[derive(Debug)]
pub struct Mp3Frames {
    pub info: StreamInfo,
    /// 按顺序排列的完整帧（含帧头）
    pub payload: Vec<u8>,
    /// 每声道样本数
    pub samples: u64,
}

/// 解码后的 PCM
#[derive(Debug)]
pub struct DecodedAudio {
    pub info: StreamInfo,
    /// 交错排列的 f32 样本
    pub samples: Vec<f32>,
}

impl DecodedAudio {
    /// 每声道样本数
    pub fn frames(&self) -> u64 {
        if self.info.channels == 0 {
            0
        } else {
            self.samples.len() as u64 / self.info.channels as u64
        }
    }
}

/// 样本数换算为毫秒
pub fn samples_to_ms(samples: u64, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        0
    } else {
        samples * 1000 / sample_rate as u64
    }
}

struct OpenedTrack {
    format: Box<dyn FormatReader>,
    track_id: u32,
    codec_params: symphonia::core::codecs::CodecParameters,
    info: StreamInfo,
}

/// 重采样器每次处理的帧数
const RESAMPLE_CHUNK: usize = 1024;

/// LAME flush 需要的输出空间
const MP3_FLUSH_RESERVE: usize = 7200;

fn encoding(err: impl std::fmt::Display) -> JoinError {
    JoinError::EncodingError(err.to_string())
}

fn invalid(index: usize, message: impl Into<String>) -> JoinError {
    JoinError::InvalidInput {
        index,
        message: message.into(),
    }
}

fn open(data: &[u8], index: usize) -> Result<OpenedTrack, JoinError> {
    if data.is_empty() {
        return Err(invalid(index, "empty audio"));
    }

    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| invalid(index, format!("unrecognized container: {}", e)))?;

    let format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| invalid(index, "no audio track found"))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| invalid(index, "unknown sample rate"))?;
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u8)
        .ok_or_else(|| invalid(index, "unknown channel count"))?;

    Ok(OpenedTrack {
        track_id: track.id,
        codec_params: track.codec_params.clone(),
        info: StreamInfo {
            sample_rate,
            channels,
        },
        format,
    })
}

fn is_end_of_stream(err: &SymphoniaError) -> bool {
    matches!(err, SymphoniaError::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
}

/// 读取流参数
pub fn read_stream_info(data: &[u8], index: usize) -> Result<StreamInfo, JoinError> {
    Ok(open(data, index)?.info)
}

/// 解复用 MP3，收集完整帧，不解码
pub fn demux_mp3(data: &[u8], index: usize) -> Result<Mp3Frames, JoinError> {
    let mut opened = open(data, index)?;
    if opened.codec_params.codec != CODEC_TYPE_MP3 {
        return Err(invalid(index, "not an MPEG Layer III stream"));
    }

    let mut payload = Vec::with_capacity(data.len());
    let mut samples = 0u64;

    loop {
        let packet = match opened.format.next_packet() {
            Ok(p) => p,
            Err(e) if is_end_of_stream(&e) => break,
            Err(e) => return Err(invalid(index, format!("packet read error: {}", e))),
        };
        if packet.track_id() != opened.track_id {
            continue;
        }
        samples += packet.dur;
        payload.extend_from_slice(packet.buf());
    }

    if payload.is_empty() {
        return Err(invalid(index, "no audio frames"));
    }

    Ok(Mp3Frames {
        info: opened.info,
        payload,
        samples,
    })
}

/// 解码为 f32 PCM
pub fn decode(data: &[u8], index: usize) -> Result<DecodedAudio, JoinError> {
    let mut opened = open(data, index)?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&opened.codec_params, &DecoderOptions::default())
        .map_err(|e| JoinError::DecodingError(format!("clip {}: {}", index, e)))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match opened.format.next_packet() {
            Ok(p) => p,
            Err(e) if is_end_of_stream(&e) => break,
            Err(e) => {
                return Err(JoinError::DecodingError(format!(
                    "clip {}: packet read error: {}",
                    index, e
                )))
            }
        };
        if packet.track_id() != opened.track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(clip = index, "Decode error (skipping packet): {}", e);
                continue;
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        let actual_samples = num_frames * spec.channels.count();
        samples.extend(&sample_buf.samples()[..actual_samples]);
    }

    Ok(DecodedAudio {
        info: opened.info,
        samples,
    })
}

/// 交错样本转换声道数
///
/// 单声道上混为复制，下混为单声道时取平均
pub fn remix(samples: &[f32], from: u8, to: u8) -> Vec<f32> {
    let (from, to) = (from as usize, to as usize);
    if from == to || from == 0 || to == 0 {
        return samples.to_vec();
    }

    let mut out = Vec::with_capacity(samples.len() / from * to);
    for frame in samples.chunks_exact(from) {
        if to == 1 {
            out.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            out.extend((0..to).map(|channel| frame[channel % from]));
        }
    }
    out
}

fn append_planar(output: &mut [Vec<f32>], processed: Vec<Vec<f32>>) -> usize {
    let produced = processed.first().map_or(0, Vec::len);
    for (channel, chunk) in output.iter_mut().zip(processed) {
        channel.extend(chunk);
    }
    produced
}

/// 交错样本重采样，输出帧数为 `frames * to_rate / from_rate`
pub fn resample(
    samples: &[f32],
    channels: u8,
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<f32>, JoinError> {
    let channels = channels as usize;
    if from_rate == to_rate || channels == 0 || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let frames = samples.len() / channels;
    let mut planar: Vec<Vec<f32>> = vec![Vec::with_capacity(frames); channels];
    for frame in samples.chunks_exact(channels) {
        for (channel, &sample) in planar.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(
        to_rate as f64 / from_rate as f64,
        1.0,
        params,
        RESAMPLE_CHUNK,
        channels,
    )
    .map_err(encoding)?;

    let expected = (frames as u64 * to_rate as u64 / from_rate as u64) as usize;
    let delay = resampler.output_delay();
    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(expected + delay); channels];

    let mut position = 0;
    while position < frames {
        let end = (position + RESAMPLE_CHUNK).min(frames);
        let chunk: Vec<&[f32]> = planar.iter().map(|c| &c[position..end]).collect();
        let processed = if end - position == RESAMPLE_CHUNK {
            resampler.process(chunk.as_slice(), None)
        } else {
            resampler.process_partial(Some(chunk.as_slice()), None)
        }
        .map_err(encoding)?;
        append_planar(&mut output, processed);
        position = end;
    }

    // 补齐重采样器延迟
    let mut produced = output.first().map_or(0, Vec::len);
    while produced < expected + delay {
        let processed = resampler
            .process_partial::<Vec<f32>>(None, None)
            .map_err(encoding)?;
        let added = append_planar(&mut output, processed);
        if added == 0 {
            break;
        }
        produced += added;
    }

    let mut interleaved = Vec::with_capacity(expected * channels);
    for frame in delay..delay + expected {
        for channel in &output {
            interleaved.push(channel.get(frame).copied().unwrap_or(0.0));
        }
    }
    Ok(interleaved)
}

/// 转换为目标流参数（先转声道，再重采样）
pub fn convert(audio: &DecodedAudio, target: StreamInfo) -> Result<Vec<f32>, JoinError> {
    if audio.info == target {
        return Ok(audio.samples.clone());
    }
    let remixed = remix(&audio.samples, audio.info.channels, target.channels);
    resample(
        &remixed,
        target.channels,
        audio.info.sample_rate,
        target.sample_rate,
    )
}

fn to_i16(samples: &[f32]) -> impl Iterator<Item = i16> + '_ {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
}

/// 用 LAME 编码为 128 kbps MP3
pub fn encode_mp3(info: StreamInfo, samples: &[f32]) -> Result<Vec<u8>, JoinError> {
    let mut builder = mp3lame_encoder::Builder::new()
        .ok_or_else(|| encoding("failed to create LAME encoder"))?;
    builder.set_num_channels(info.channels).map_err(encoding)?;
    builder.set_sample_rate(info.sample_rate).map_err(encoding)?;
    builder.set_brate(Bitrate::Kbps128).map_err(encoding)?;
    builder.set_quality(Quality::Good).map_err(encoding)?;
    let mut encoder = builder.build().map_err(encoding)?;

    let pcm: Vec<i16> = to_i16(samples).collect();
    let frames = pcm.len() / (info.channels.max(1) as usize);

    let mut output =
        Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(frames) + MP3_FLUSH_RESERVE);
    if info.channels == 1 {
        encoder.encode_to_vec(MonoPcm(&pcm), &mut output)
    } else {
        encoder.encode_to_vec(InterleavedPcm(&pcm), &mut output)
    }
    .map_err(encoding)?;

    output.reserve(MP3_FLUSH_RESERVE);
    encoder
        .flush_to_vec::<FlushNoGap>(&mut output)
        .map_err(encoding)?;

    Ok(output)
}

/// 编码为 16 位 PCM WAV
pub fn encode_wav(info: StreamInfo, samples: &[f32]) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let num_channels = info.channels as u16;
    let sample_rate = info.sample_rate;
    let byte_rate = sample_rate * num_channels as u32 * (bits_per_sample / 8) as u32;
    let block_align = num_channels * (bits_per_sample / 8);

    let data_size = samples.len() * 2;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(44 + data_size);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(file_size as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&num_channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data_size as u32).to_le_bytes());

    for sample in to_i16(samples) {
        wav.extend_from_slice(&sample.to_le_bytes());
    }

    wav
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! 测试用的合成音频

    use super::{encode_wav, StreamInfo};

    /// MPEG-1 Layer III 128 kbps 44.1 kHz 帧长（无填充）
    pub const MP3_FRAME_LEN: usize = 417;
    pub const MP3_FRAME_SAMPLES: u64 = 1152;

    /// 48 kHz 下的帧长
    pub const MP3_FRAME_LEN_48K: usize = 384;

    fn frames_of(header: [u8; 4], frame_len: usize, frames: usize, tag: u8) -> Vec<u8> {
        let mut data = Vec::with_capacity(frames * frame_len);
        for _ in 0..frames {
            let mut frame = vec![0u8; frame_len];
            frame[..4].copy_from_slice(&header);
            frame[frame_len - 1] = tag;
            data.extend_from_slice(&frame);
        }
        data
    }

    fn mode(stereo: bool) -> u8 {
        if stereo {
            0x00
        } else {
            0xC0
        }
    }

    /// 生成 `frames` 个 44.1 kHz 静音 MP3 帧，`tag` 写入每帧最后一个字节以区分来源
    pub fn mp3_clip(frames: usize, stereo: bool, tag: u8) -> Vec<u8> {
        frames_of([0xFF, 0xFB, 0x90, mode(stereo)], MP3_FRAME_LEN, frames, tag)
    }

    /// 同上，48 kHz
    pub fn mp3_clip_48k(frames: usize, stereo: bool, tag: u8) -> Vec<u8> {
        frames_of([0xFF, 0xFB, 0x94, mode(stereo)], MP3_FRAME_LEN_48K, frames, tag)
    }

    /// 生成单声道 WAV
    pub fn wav_clip(sample_rate: u32, samples: usize) -> Vec<u8> {
        encode_wav(
            StreamInfo {
                sample_rate,
                channels: 1,
            },
            &vec![0.25; samples],
        )
    }
}
