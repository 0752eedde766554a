//! OpenAI Whisper API client for speech-to-text transcription
//!
//! Uses the OpenAI Whisper API to transcribe WAV audio files to text.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const DEFAULT_MODEL: &str = "whisper-1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that can occur during transcription
#[derive(Debug)]
pub enum TranscriptionError {
    /// OpenAI API key not configured
    MissingApiKey,
    /// Could not construct the HTTP client
    ClientBuildFailed(String),
    /// Failed to read audio file
    FileReadError(String),
    /// Network/HTTP error
    NetworkError(String),
    /// OpenAI API returned an error
    ApiError { status: u16, message: String },
    /// Failed to parse API response
    ParseError(String),
}

impl std::fmt::Display for TranscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptionError::MissingApiKey => {
                write!(
                    f,
                    "OpenAI API key not configured. Set OPENAI_API_KEY environment variable."
                )
            }
            TranscriptionError::ClientBuildFailed(e) => {
                write!(f, "Failed to build HTTP client: {}", e)
            }
            TranscriptionError::FileReadError(e) => write!(f, "Failed to read audio file: {}", e),
            TranscriptionError::NetworkError(e) => write!(f, "Network error: {}", e),
            TranscriptionError::ApiError { status, message } => {
                write!(f, "OpenAI API error ({}): {}", status, message)
            }
            TranscriptionError::ParseError(e) => write!(f, "Failed to parse API response: {}", e),
        }
    }
}

impl std::error::Error for TranscriptionError {}

/// OpenAI Whisper API response
#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
}

/// OpenAI API error response
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Get the OpenAI API key from the environment.
fn get_api_key() -> Option<String> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Some(key),
        _ => None,
    }
}

/// Check if an API key is configured (for the preflight message)
pub fn is_api_key_configured() -> bool {
    get_api_key().is_some()
}

/// Whisper API client holding its own HTTP connection pool.
///
/// Constructed once and passed to the pipeline, so every call site has an
/// explicit handle instead of reaching for process-wide state.
pub struct WhisperClient {
    http: Client,
    api_key: String,
    model: String,
}

impl WhisperClient {
    /// Create a client with the API key taken from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self, TranscriptionError> {
        Self::from_env_with_model(DEFAULT_MODEL.to_string())
    }

    /// Like [`from_env`](Self::from_env) but with an explicit model name.
    pub fn from_env_with_model(model: String) -> Result<Self, TranscriptionError> {
        let api_key = get_api_key().ok_or(TranscriptionError::MissingApiKey)?;
        Self::new(api_key, model)
    }

    pub fn new(api_key: String, model: String) -> Result<Self, TranscriptionError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TranscriptionError::ClientBuildFailed(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model,
        })
    }

    /// Transcribe an audio file using the OpenAI Whisper API.
    ///
    /// Returns the transcribed text, or an error describing which stage of
    /// the request failed.
    pub async fn transcribe(&self, wav_path: &Path) -> Result<String, TranscriptionError> {
        let file_bytes = tokio::fs::read(wav_path)
            .await
            .map_err(|e| TranscriptionError::FileReadError(e.to_string()))?;

        // Get filename for the multipart form
        let filename = wav_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        log::info!(
            "Transcribing audio file: {} ({} bytes)",
            filename,
            file_bytes.len()
        );

        let file_part = Part::bytes(file_bytes)
            .file_name(filename)
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionError::ParseError(e.to_string()))?;

        let form = Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("temperature", "0");

        let response = self
            .http
            .post(TRANSCRIPTION_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status.is_success() {
            let whisper_response: WhisperResponse = response
                .json()
                .await
                .map_err(|e| TranscriptionError::ParseError(e.to_string()))?;

            log::info!(
                "Transcription successful: {} chars",
                whisper_response.text.len()
            );

            Ok(whisper_response.text)
        } else {
            let error_text = response.text().await.unwrap_or_default();

            let message =
                if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
                    error_response.error.message
                } else {
                    error_text
                };

            log::error!("OpenAI API error ({}): {}", status.as_u16(), message);

            Err(TranscriptionError::ApiError {
                status: status.as_u16(),
                message,
            })
        }
    }
}
