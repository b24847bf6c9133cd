//! Chaptercast - 电子书章节转有声书服务
//!
//! 启动流程: 配置 -> 日志 -> 适配器 -> 应用状态 -> HTTP 服务器

use std::sync::Arc;

use chaptercast::application::{ChapterPreparer, SynthesisSettings, TtsEnginePort};
use chaptercast::config::{load_config, print_config, AppConfig, TtsConfig};
use chaptercast::domain::{ChunkConfig, RewriteTable};
use chaptercast::infrastructure::adapters::{
    build_joiner, Credentials, FakeTtsClient, FileAudioStorage, GoogleTtsClient,
    GoogleTtsClientConfig,
};
use chaptercast::infrastructure::http::{AppState, HttpServer, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Chaptercast - 电子书章节转有声书");
    print_config(&config);

    // 确保输出目录存在
    tokio::fs::create_dir_all(&config.storage.output_dir).await?;

    let tts_engine = build_tts_engine(&config.tts)?;
    let joiner = build_joiner(config.audio.join_strategy, config.audio.ffmpeg_path.clone());
    let storage = Arc::new(FileAudioStorage::new(&config.storage.output_dir).await?);

    let preparer = ChapterPreparer::new(
        RewriteTable::fiction_book(),
        ChunkConfig {
            max_bytes: config.chunking.max_bytes,
        },
    );
    let settings = SynthesisSettings {
        voice: config.voice.clone(),
        output_format: config.audio.output_format,
        max_concurrent: config.synthesis.max_concurrent,
    };

    let state = AppState::new(tts_engine, joiner, storage, preparer, settings);

    let server = HttpServer::new(ServerConfig::from(&config), state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志（RUST_LOG 优先于配置文件中的级别）
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},chaptercast={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 配置了 fake_audio_path 时使用固定音频，否则调用 Google TTS
fn build_tts_engine(config: &TtsConfig) -> anyhow::Result<Arc<dyn TtsEnginePort>> {
    if let Some(path) = &config.fake_audio_path {
        tracing::warn!(path = %path.display(), "Using fake TTS engine");
        return Ok(Arc::new(FakeTtsClient::from_file(path)?));
    }

    let mut client_config =
        GoogleTtsClientConfig::new(&config.base_url).with_timeout(config.timeout_secs);
    if let Some(key) = &config.api_key {
        client_config = client_config.with_credentials(Credentials::ApiKey(key.clone()));
    } else if let Some(token) = &config.access_token {
        client_config = client_config.with_credentials(Credentials::AccessToken(token.clone()));
    }

    Ok(Arc::new(GoogleTtsClient::new(client_config)?))
}
