//! Fake TTS Client - 离线/测试用的 TTS 客户端
//!
//! 始终返回固定的音频，不实际调用 TTS 服务

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::application::ports::{
    AudioEncoding, SynthesizeRequest, SynthesizeResponse, TtsEnginePort, TtsError,
};

/// Fake TTS Client
pub struct FakeTtsClient {
    audio_data: Vec<u8>,
    /// 模拟的合成延迟
    latency: Duration,
}

impl FakeTtsClient {
    /// 使用内存中的音频创建
    pub fn from_bytes(audio_data: Vec<u8>) -> Self {
        Self {
            audio_data,
            latency: Duration::ZERO,
        }
    }

    /// 从文件读取固定返回的音频
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        let audio_data = std::fs::read(path)?;
        tracing::info!(
            path = %path.display(),
            size = audio_data.len(),
            "FakeTtsClient initialized"
        );
        Ok(Self::from_bytes(audio_data))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn synthesize(&self, request: SynthesizeRequest) -> Result<SynthesizeResponse, TtsError> {
        tracing::debug!(
            text_bytes = request.text.len(),
            "FakeTtsClient: returning fixed audio"
        );

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(SynthesizeResponse {
            audio_data: self.audio_data.clone(),
            encoding: AudioEncoding::Mp3,
        })
    }
}
