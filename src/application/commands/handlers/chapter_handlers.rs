//! Chapter Command Handlers

use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

use crate::application::commands::{ExtractChapters, ListChapters, OutputMode, SynthesizeChapters};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioClip, AudioFormat, AudioJoinerPort, AudioStoragePort, SynthesizeRequest, TtsEnginePort,
    VoiceConfig,
};
use crate::domain::{
    chunk_segments, clean_text, extract_chapters, list_sections, ChapterRange, ChapterText,
    ChunkConfig, RewriteTable, SectionSummary, TextChunk,
};

// ============================================================================
// Shared types
// ============================================================================

/// 章节跳过原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 索引超出 section 数量
    OutOfRange { available: usize },
    /// 清洗后没有文本
    NoText,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::OutOfRange { .. } => "out_of_range",
            SkipReason::NoText => "no_text",
        }
    }
}

/// 被跳过的章节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedChapter {
    pub index: usize,
    pub reason: SkipReason,
}

/// 单个章节的分块结果
#[derive(Debug, Clone)]
pub struct ChapterChunks {
    pub index: usize,
    pub chunks: Vec<TextChunk>,
}

/// 写入输出目录的音频文件
#[derive(Debug, Clone)]
pub struct GeneratedAudio {
    pub file_name: String,
    /// 包含的章节索引（合并上传时为空）
    pub chapters: Vec<usize>,
    pub clip_count: usize,
    pub duration_ms: u64,
    pub size_bytes: u64,
}

// ============================================================================
// ChapterPreparer (extract -> clean -> chunk)
// ============================================================================

/// 提取、清洗并分块
///
/// 越界章节记录到 `skipped`，已提取的章节照常返回
#[derive(Debug, Clone)]
pub struct ChapterPreparer {
    table: RewriteTable,
    chunk_config: ChunkConfig,
}

/// 准备结果
#[derive(Debug, Clone, Default)]
pub struct PreparedChapters {
    pub chapters: Vec<ChapterChunks>,
    pub skipped: Vec<SkippedChapter>,
}

impl ChapterPreparer {
    pub fn new(table: RewriteTable, chunk_config: ChunkConfig) -> Self {
        Self {
            table,
            chunk_config,
        }
    }

    pub fn prepare(
        &self,
        content: &[u8],
        range: ChapterRange,
        max_chunk_bytes: Option<usize>,
    ) -> Result<PreparedChapters, ApplicationError> {
        let chunk_config = match max_chunk_bytes {
            Some(0) => {
                return Err(ApplicationError::validation(
                    "max_chunk_bytes must be greater than 0",
                ))
            }
            Some(max_bytes) => ChunkConfig { max_bytes },
            None => self.chunk_config.clone(),
        };

        let mut prepared = PreparedChapters::default();

        let extracted = extract_chapters(content, range)?;
        for (index, chapter) in range.iter().zip(extracted) {
            match chapter {
                ChapterText::Found(markup) => {
                    let text = clean_text(&markup, &self.table);
                    let chunks = chunk_segments(&text, &chunk_config);
                    tracing::debug!(
                        chapter = index,
                        chunks = chunks.len(),
                        text_bytes = text.len(),
                        "Chapter prepared"
                    );
                    prepared.chapters.push(ChapterChunks { index, chunks });
                }
                ChapterText::OutOfRange { index, available } => {
                    tracing::warn!(chapter = index, available, "Chapter number out of range");
                    prepared.skipped.push(SkippedChapter {
                        index,
                        reason: SkipReason::OutOfRange { available },
                    });
                    // 只有第一个越界索引会出现在结果中
                }
            }
        }

        Ok(prepared)
    }
}

impl Default for ChapterPreparer {
    fn default() -> Self {
        Self::new(RewriteTable::fiction_book(), ChunkConfig::default())
    }
}

// ============================================================================
// ListChapters
// ============================================================================

/// ListChapters Handler
pub struct ListChaptersHandler;

impl ListChaptersHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, command: ListChapters) -> Result<Vec<SectionSummary>, ApplicationError> {
        let sections = list_sections(&command.content)?;
        tracing::info!(sections = sections.len(), "Chapters listed");
        Ok(sections)
    }
}

impl Default for ListChaptersHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ExtractChapters
// ============================================================================

/// ExtractChapters Handler - 只提取和分块，用于预览
pub struct ExtractChaptersHandler {
    preparer: ChapterPreparer,
}

impl ExtractChaptersHandler {
    pub fn new(preparer: ChapterPreparer) -> Self {
        Self { preparer }
    }

    pub fn handle(&self, command: ExtractChapters) -> Result<PreparedChapters, ApplicationError> {
        let prepared =
            self.preparer
                .prepare(&command.content, command.range, command.max_chunk_bytes)?;

        tracing::info!(
            range = %command.range,
            chapters = prepared.chapters.len(),
            skipped = prepared.skipped.len(),
            "Chapters extracted"
        );

        Ok(prepared)
    }
}

// ============================================================================
// SynthesizeChapters
// ============================================================================

/// 合成响应
#[derive(Debug, Clone)]
pub struct SynthesizeChaptersResponse {
    pub files: Vec<GeneratedAudio>,
    pub skipped: Vec<SkippedChapter>,
}

/// 合成参数
#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    pub voice: VoiceConfig,
    pub output_format: AudioFormat,
    /// 同时进行中的合成请求数，1 表示严格顺序
    pub max_concurrent: usize,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            voice: VoiceConfig::default(),
            output_format: AudioFormat::Mp3,
            max_concurrent: 1,
        }
    }
}

/// SynthesizeChapters Handler
///
/// 每个文本块调用一次 TTS（按块顺序），任何一次失败都会中止整个运行
pub struct SynthesizeChaptersHandler {
    preparer: ChapterPreparer,
    tts_engine: Arc<dyn TtsEnginePort>,
    joiner: Arc<dyn AudioJoinerPort>,
    storage: Arc<dyn AudioStoragePort>,
    settings: SynthesisSettings,
}

impl SynthesizeChaptersHandler {
    pub fn new(
        preparer: ChapterPreparer,
        tts_engine: Arc<dyn TtsEnginePort>,
        joiner: Arc<dyn AudioJoinerPort>,
        storage: Arc<dyn AudioStoragePort>,
        settings: SynthesisSettings,
    ) -> Self {
        Self {
            preparer,
            tts_engine,
            joiner,
            storage,
            settings,
        }
    }

    pub async fn handle(
        &self,
        command: SynthesizeChapters,
    ) -> Result<SynthesizeChaptersResponse, ApplicationError> {
        let prepared = self.preparer.prepare(&command.content, command.range, None)?;
        let mut skipped = prepared.skipped;

        let mut chapters = Vec::with_capacity(prepared.chapters.len());
        for chapter in prepared.chapters {
            if chapter.chunks.is_empty() {
                tracing::warn!(chapter = chapter.index, "Chapter has no text, skipped");
                skipped.push(SkippedChapter {
                    index: chapter.index,
                    reason: SkipReason::NoText,
                });
            } else {
                chapters.push(chapter);
            }
        }
        skipped.sort_by_key(|s| s.index);

        if chapters.is_empty() {
            return Err(ApplicationError::business_rule(format!(
                "No chapters with text in range {}",
                command.range
            )));
        }

        let files = match command.mode {
            OutputMode::PerChapter => {
                let mut files = Vec::with_capacity(chapters.len());
                for chapter in &chapters {
                    let clips = self.synthesize_chunks(chapter.index, &chapter.chunks).await?;
                    let file_name = format!(
                        "chapter_{}.{}",
                        chapter.index,
                        self.settings.output_format.extension()
                    );
                    files.push(self.export(clips, file_name, vec![chapter.index]).await?);
                }
                files
            }
            OutputMode::Combined => {
                let mut clips = Vec::new();
                for chapter in &chapters {
                    let chapter_clips =
                        self.synthesize_chunks(chapter.index, &chapter.chunks).await?;
                    clips.extend(chapter_clips);
                }
                // 跨章节重新编号
                for (index, clip) in clips.iter_mut().enumerate() {
                    clip.index = index;
                }
                let file_name = format!(
                    "chapters_{}-{}.{}",
                    command.range.first(),
                    command.range.last(),
                    self.settings.output_format.extension()
                );
                let indexes = chapters.iter().map(|c| c.index).collect();
                vec![self.export(clips, file_name, indexes).await?]
            }
        };

        Ok(SynthesizeChaptersResponse { files, skipped })
    }

    /// 按块顺序合成；`max_concurrent > 1` 时允许多个请求同时进行，结果仍按原顺序返回
    async fn synthesize_chunks(
        &self,
        chapter: usize,
        chunks: &[TextChunk],
    ) -> Result<Vec<AudioClip>, ApplicationError> {
        let window = self.settings.max_concurrent.max(1);

        tracing::info!(chapter, chunks = chunks.len(), window, "Synthesizing chapter");

        let clips = stream::iter(chunks.iter().cloned())
            .map(|chunk| {
                let tts_engine = self.tts_engine.clone();
                let voice = self.settings.voice.clone();
                async move {
                    let request = SynthesizeRequest {
                        text: chunk.content,
                        voice,
                    };
                    match tts_engine.synthesize(request).await {
                        Ok(response) => Ok(AudioClip::new(chunk.index, response.audio_data)),
                        Err(e) => {
                            tracing::error!(
                                chapter,
                                chunk = chunk.index,
                                error = %e,
                                "Speech synthesis failed"
                            );
                            Err(e)
                        }
                    }
                }
            })
            .buffered(window)
            .try_collect::<Vec<AudioClip>>()
            .await?;

        Ok(clips)
    }

    async fn export(
        &self,
        clips: Vec<AudioClip>,
        file_name: String,
        chapters: Vec<usize>,
    ) -> Result<GeneratedAudio, ApplicationError> {
        let joined = self
            .joiner
            .join(&clips, self.settings.output_format)
            .await?;
        let stored = self.storage.save_audio(&file_name, &joined.data).await?;

        tracing::info!(
            file = %stored.file_name,
            chapters = ?chapters,
            clips = joined.clip_count,
            duration_ms = joined.duration_ms,
            strategy = %self.joiner.strategy(),
            "Audio exported"
        );

        Ok(GeneratedAudio {
            file_name: stored.file_name,
            chapters,
            clip_count: joined.clip_count,
            duration_ms: joined.duration_ms,
            size_bytes: stored.size_bytes,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{ConcatJoiner, EchoTts, MemoryStorage};
    use super::*;

    const BOOK: &str = "<FictionBook><body>\
        <section><title><p>Глава 0</p></title><p>один два три</p></section>\
        <section><title><p>Глава 1</p></title><p>четыре пять</p></section>\
        <section></section>\
        </body></FictionBook>";

    fn preparer(max_bytes: usize) -> ChapterPreparer {
        ChapterPreparer::new(RewriteTable::default(), ChunkConfig { max_bytes })
    }

    fn handler(
        tts: Arc<EchoTts>,
        storage: Arc<MemoryStorage>,
        max_bytes: usize,
    ) -> SynthesizeChaptersHandler {
        SynthesizeChaptersHandler::new(
            preparer(max_bytes),
            tts,
            Arc::new(ConcatJoiner),
            storage,
            SynthesisSettings::default(),
        )
    }

    #[test]
    fn test_prepare_skips_out_of_range_and_continues() {
        let prepared = preparer(4970)
            .prepare(BOOK.as_bytes(), ChapterRange::new(1, 3), None)
            .unwrap();

        assert_eq!(prepared.chapters.len(), 2);
        assert_eq!(prepared.chapters[0].index, 1);
        assert_eq!(prepared.chapters[0].chunks[0].content, "Глава 1 четыре пять");
        assert!(prepared.chapters[1].chunks.is_empty());
        assert_eq!(
            prepared.skipped,
            vec![SkippedChapter {
                index: 3,
                reason: SkipReason::OutOfRange { available: 3 }
            }]
        );
    }

    #[test]
    fn test_prepare_open_ended_range() {
        let prepared = preparer(4970)
            .prepare(BOOK.as_bytes(), ChapterRange::new(0, usize::MAX), None)
            .unwrap();

        let indices: Vec<usize> = prepared.chapters.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(
            prepared.skipped,
            vec![SkippedChapter {
                index: 3,
                reason: SkipReason::OutOfRange { available: 3 }
            }]
        );
    }

    #[test]
    fn test_prepare_max_chunk_override() {
        let prepared = preparer(4970)
            .prepare(BOOK.as_bytes(), ChapterRange::single(0), Some(20))
            .unwrap();
        let chunks: Vec<&str> = prepared.chapters[0]
            .chunks
            .iter()
            .map(|c| c.content.as_str())
            .collect();
        // "Глава 0 один" = 10+1+1+1+8 = 21 字节 > 20
        assert_eq!(chunks, vec!["Глава 0", "один два", "три"]);
    }

    #[test]
    fn test_prepare_rejects_zero_chunk_size() {
        let result = preparer(4970).prepare(BOOK.as_bytes(), ChapterRange::single(0), Some(0));
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }

    #[test]
    fn test_reversed_range_prepares_nothing() {
        let prepared = preparer(4970)
            .prepare(BOOK.as_bytes(), ChapterRange::new(2, 0), None)
            .unwrap();
        assert!(prepared.chapters.is_empty());
        assert!(prepared.skipped.is_empty());
    }

    #[test]
    fn test_list_chapters() {
        let sections = ListChaptersHandler::new()
            .handle(ListChapters {
                content: BOOK.as_bytes().to_vec(),
            })
            .unwrap();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[1].title.as_deref(), Some("Глава 1"));
    }

    #[tokio::test]
    async fn test_synthesize_per_chapter() {
        let tts = Arc::new(EchoTts::default());
        let storage = Arc::new(MemoryStorage::default());
        let handler = handler(tts.clone(), storage.clone(), 12);

        let response = handler
            .handle(SynthesizeChapters {
                content: BOOK.as_bytes().to_vec(),
                range: ChapterRange::new(0, 3),
                mode: OutputMode::PerChapter,
            })
            .await
            .unwrap();

        let names: Vec<&str> = response.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["chapter_0.mp3", "chapter_1.mp3"]);
        assert_eq!(
            storage.get("chapter_1.mp3").unwrap(),
            "[Глава 1][четыре][пять]"
        );
        assert_eq!(
            response.skipped,
            vec![
                SkippedChapter {
                    index: 2,
                    reason: SkipReason::NoText
                },
                SkippedChapter {
                    index: 3,
                    reason: SkipReason::OutOfRange { available: 3 }
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_synthesize_combined_preserves_order() {
        let tts = Arc::new(EchoTts::default());
        let storage = Arc::new(MemoryStorage::default());
        let handler = handler(tts.clone(), storage.clone(), 4970);

        let response = handler
            .handle(SynthesizeChapters {
                content: BOOK.as_bytes().to_vec(),
                range: ChapterRange::new(0, 1),
                mode: OutputMode::Combined,
            })
            .await
            .unwrap();

        assert_eq!(response.files.len(), 1);
        assert_eq!(response.files[0].file_name, "chapters_0-1.mp3");
        assert_eq!(response.files[0].chapters, vec![0, 1]);
        assert_eq!(response.files[0].clip_count, 2);
        assert_eq!(
            storage.get("chapters_0-1.mp3").unwrap(),
            "[Глава 0 один два три][Глава 1 четыре пять]"
        );
    }

    #[tokio::test]
    async fn test_synthesis_failure_aborts_run() {
        let tts = Arc::new(EchoTts {
            fail_on: Some("Глава 0 один два три".to_string()),
            ..Default::default()
        });
        let storage = Arc::new(MemoryStorage::default());
        let handler = handler(tts.clone(), storage.clone(), 4970);

        let result = handler
            .handle(SynthesizeChapters {
                content: BOOK.as_bytes().to_vec(),
                range: ChapterRange::new(0, 1),
                mode: OutputMode::PerChapter,
            })
            .await;

        assert!(matches!(result, Err(ApplicationError::ExternalServiceError(_))));
        // 后续章节不再合成
        assert_eq!(tts.calls.lock().unwrap().len(), 1);
        assert!(storage.files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_window_keeps_chunk_order() {
        let tts = Arc::new(EchoTts::default());
        let storage = Arc::new(MemoryStorage::default());
        let handler = SynthesizeChaptersHandler::new(
            preparer(6),
            tts,
            Arc::new(ConcatJoiner),
            storage.clone(),
            SynthesisSettings {
                max_concurrent: 4,
                ..Default::default()
            },
        );

        handler
            .handle(SynthesizeChapters {
                content: BOOK.as_bytes().to_vec(),
                range: ChapterRange::single(0),
                mode: OutputMode::PerChapter,
            })
            .await
            .unwrap();

        assert_eq!(
            storage.get("chapter_0.mp3").unwrap(),
            "[Глава][0][один][два][три]"
        );
    }

    #[tokio::test]
    async fn test_no_text_in_range_is_an_error() {
        let tts = Arc::new(EchoTts::default());
        let storage = Arc::new(MemoryStorage::default());
        let handler = handler(tts.clone(), storage, 4970);

        let result = handler
            .handle(SynthesizeChapters {
                content: BOOK.as_bytes().to_vec(),
                range: ChapterRange::new(2, 9),
                mode: OutputMode::Combined,
            })
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::BusinessRuleViolation(_))
        ));
        assert!(tts.calls.lock().unwrap().is_empty());
    }
}
