//! Google TTS Client - 调用 Cloud Text-to-Speech REST 接口
//!
//! 实现 TtsEnginePort trait
//!
//! POST {base_url}/v1/text:synthesize
//! Request: {"input": {"text": "..."}, "voice": {...}, "audioConfig": {...}}
//! Response: {"audioContent": "<base64>"}

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{
    AudioEncoding, SsmlGender, SynthesizeRequest, SynthesizeResponse, TtsEnginePort, TtsError,
};

pub const DEFAULT_BASE_URL: &str = "https://texttospeech.googleapis.com";

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelectionParams<'a> {
    language_code: &'a str,
    name: &'a str,
    ssml_gender: SsmlGender,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: AudioEncoding,
    volume_gain_db: f64,
    speaking_rate: f64,
    pitch: f64,
    sample_rate_hertz: u32,
}

/// 请求体 (JSON)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeBody<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelectionParams<'a>,
    audio_config: AudioConfig,
}

/// 响应体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeReply {
    audio_content: Option<String>,
}

/// 认证方式
#[derive(Debug, Clone)]
pub enum Credentials {
    /// `?key=` 查询参数
    ApiKey(String),
    /// `Authorization: Bearer` 访问令牌
    AccessToken(String),
}

/// Google TTS 客户端配置
#[derive(Debug, Clone)]
pub struct GoogleTtsClientConfig {
    pub base_url: String,
    pub credentials: Option<Credentials>,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for GoogleTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: None,
            timeout_secs: 60,
        }
    }
}

impl GoogleTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// Google TTS 客户端
pub struct GoogleTtsClient {
    client: Client,
    config: GoogleTtsClientConfig,
}

impl GoogleTtsClient {
    /// 创建客户端，没有凭据时直接失败
    pub fn new(config: GoogleTtsClientConfig) -> Result<Self, TtsError> {
        if config.credentials.is_none() {
            return Err(TtsError::MissingCredentials(
                "either tts.api_key or tts.access_token must be set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn synthesize_url(&self) -> String {
        format!(
            "{}/v1/text:synthesize",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn voices_url(&self) -> String {
        format!("{}/v1/voices", self.config.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.credentials {
            Some(Credentials::ApiKey(key)) => builder.query(&[("key", key)]),
            Some(Credentials::AccessToken(token)) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl TtsEnginePort for GoogleTtsClient {
    async fn synthesize(&self, request: SynthesizeRequest) -> Result<SynthesizeResponse, TtsError> {
        let voice = &request.voice;
        let body = SynthesizeBody {
            input: SynthesisInput {
                text: &request.text,
            },
            voice: VoiceSelectionParams {
                language_code: &voice.language_code,
                name: &voice.voice_name,
                ssml_gender: voice.ssml_gender,
            },
            audio_config: AudioConfig {
                audio_encoding: voice.audio_encoding,
                volume_gain_db: voice.volume_gain_db,
                speaking_rate: voice.speaking_rate,
                pitch: voice.pitch,
                sample_rate_hertz: voice.sample_rate_hertz,
            },
        };

        tracing::debug!(
            url = %self.synthesize_url(),
            text_bytes = request.text.len(),
            voice = %voice.voice_name,
            "Sending synthesize request"
        );

        let response = self
            .authorize(self.client.post(self.synthesize_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else if e.is_connect() {
                    TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    TtsError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let reply: SynthesizeReply = response
            .json()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let encoded = reply
            .audio_content
            .ok_or_else(|| TtsError::InvalidResponse("missing audioContent".to_string()))?;
        let audio_data = base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| TtsError::InvalidResponse(format!("Invalid base64 audio: {}", e)))?;

        tracing::debug!(audio_size = audio_data.len(), "Synthesis completed");

        Ok(SynthesizeResponse {
            audio_data,
            encoding: voice.audio_encoding,
        })
    }

    async fn health_check(&self) -> bool {
        match self
            .authorize(self.client.get(self.voices_url()))
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
