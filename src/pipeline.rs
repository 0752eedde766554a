//! Pipeline orchestrator: record, transcribe, translate.
//!
//! The three stages are independent traits so each can be substituted with a
//! test double. Any stage failure is fatal for the run; there are no retries
//! and no partial results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use uuid::Uuid;

use crate::audio::{self, AudioError};
use crate::settings::Settings;
use crate::transcription::{TranscriptionError, WhisperClient};
use crate::translation::{GoogleTranslator, TranslationError};

/// Errors from any pipeline stage.
#[derive(Debug)]
pub enum PipelineError {
    Recording(AudioError),
    Transcription(TranscriptionError),
    Translation(TranslationError),
    /// The blocking recording task was cancelled or panicked.
    Canceled(String),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Recording(e) => write!(f, "Recording failed: {}", e),
            PipelineError::Transcription(e) => write!(f, "Transcription failed: {}", e),
            PipelineError::Translation(e) => write!(f, "Translation failed: {}", e),
            PipelineError::Canceled(e) => write!(f, "Recording task did not finish: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<AudioError> for PipelineError {
    fn from(e: AudioError) -> Self {
        PipelineError::Recording(e)
    }
}

impl From<TranscriptionError> for PipelineError {
    fn from(e: TranscriptionError) -> Self {
        PipelineError::Transcription(e)
    }
}

impl From<TranslationError> for PipelineError {
    fn from(e: TranslationError) -> Self {
        PipelineError::Translation(e)
    }
}

/// Produces a WAV file containing one fixed-duration recording.
/// Blocking; the orchestrator runs it on a blocking task.
pub trait RecordStage {
    fn record(&self, settings: &Settings) -> Result<PathBuf, AudioError>;
}

/// Turns a WAV file into a transcript.
///
/// Stages are only used through generics, never as trait objects, so plain
/// `async fn` in the trait is fine.
#[allow(async_fn_in_trait)]
pub trait TranscribeStage {
    async fn transcribe(&self, wav_path: &Path) -> Result<String, TranscriptionError>;
}

/// Turns text in one language into text in another.
#[allow(async_fn_in_trait)]
pub trait TranslateStage {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError>;
}

/// Production recorder: captures from the default microphone into a fresh
/// WAV file under the app's temp audio directory.
pub struct MicRecorder;

impl RecordStage for MicRecorder {
    fn record(&self, settings: &Settings) -> Result<PathBuf, AudioError> {
        let path = audio::generate_wav_path(Uuid::new_v4())
            .map_err(|e| AudioError::FileCreationFailed(e.to_string()))?;
        audio::record(&path, &settings.recording_config())
    }
}

impl TranscribeStage for WhisperClient {
    async fn transcribe(&self, wav_path: &Path) -> Result<String, TranscriptionError> {
        WhisperClient::transcribe(self, wav_path).await
    }
}

impl TranslateStage for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        GoogleTranslator::translate(self, text, source_lang, target_lang).await
    }
}

/// Result of a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The recorded WAV file, kept for inspection until cleanup.
    pub wav_path: PathBuf,
    /// Transcript in the source language.
    pub transcript: String,
    /// Transcript translated into the target language.
    pub translation: String,
}

/// Run the full record -> transcribe -> translate pipeline.
///
/// The recording stage blocks for the whole capture duration, so it runs on
/// a blocking task while the async stages stay on the runtime.
pub async fn run<R, T, L>(
    settings: &Settings,
    recorder: R,
    transcriber: &T,
    translator: &L,
) -> Result<PipelineOutput, PipelineError>
where
    R: RecordStage + Send + 'static,
    T: TranscribeStage,
    L: TranslateStage,
{
    let start = Instant::now();

    let record_settings = settings.clone();
    let wav_path = tokio::task::spawn_blocking(move || recorder.record(&record_settings))
        .await
        .map_err(|e| PipelineError::Canceled(e.to_string()))??;
    let recorded_ms = start.elapsed().as_millis() as u64;
    log::info!("Recording stage done in {} ms: {:?}", recorded_ms, wav_path);

    let transcript = transcriber.transcribe(&wav_path).await?;
    let transcribed_ms = start.elapsed().as_millis() as u64 - recorded_ms;
    log::info!(
        "Transcription stage done in {} ms ({} chars)",
        transcribed_ms,
        transcript.len()
    );

    let translation = translator
        .translate(&transcript, &settings.source_lang, &settings.target_lang)
        .await?;
    log::info!(
        "Translation stage done ({} -> {}, {} chars)",
        settings.source_lang,
        settings.target_lang,
        translation.len()
    );

    Ok(PipelineOutput {
        wav_path,
        transcript,
        translation,
    })
}
