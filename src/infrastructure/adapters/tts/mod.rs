//! TTS Adapter - 语音合成客户端实现

mod fake_tts_client;
mod google_tts_client;

pub use fake_tts_client::FakeTtsClient;
pub use google_tts_client::{Credentials, GoogleTtsClient, GoogleTtsClientConfig, DEFAULT_BASE_URL};
