//! Google Translate client for text translation
//!
//! Uses the free `gtx` endpoint of translate.googleapis.com. No API key is
//! required; the response is an undocumented nested JSON array, so parsing
//! is kept defensive and well tested.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur during translation
#[derive(Debug)]
pub enum TranslationError {
    /// Could not construct the HTTP client
    ClientBuildFailed(String),
    /// Network/HTTP error
    NetworkError(String),
    /// Translation endpoint returned an error status
    ApiError { status: u16, message: String },
    /// Response body did not have the expected shape
    ParseError(String),
}

impl std::fmt::Display for TranslationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationError::ClientBuildFailed(e) => {
                write!(f, "Failed to build HTTP client: {}", e)
            }
            TranslationError::NetworkError(e) => write!(f, "Network error: {}", e),
            TranslationError::ApiError { status, message } => {
                write!(f, "Translate API error ({}): {}", status, message)
            }
            TranslationError::ParseError(e) => {
                write!(f, "Failed to parse translation response: {}", e)
            }
        }
    }
}

impl std::error::Error for TranslationError {}

/// Google Translate gtx client holding its own HTTP connection pool.
pub struct GoogleTranslator {
    http: Client,
}

impl GoogleTranslator {
    pub fn new() -> Result<Self, TranslationError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TranslationError::ClientBuildFailed(e.to_string()))?;

        Ok(Self { http })
    }

    /// Translate `text` from `source_lang` to `target_lang` (ISO 639-1 codes,
    /// e.g. "de" -> "tr").
    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        log::info!(
            "Translating {} chars: {} -> {}",
            text.len(),
            source_lang,
            target_lang
        );

        let response = self
            .http
            .get(TRANSLATE_URL)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::error!("Translate API error ({}): {}", status.as_u16(), message);
            return Err(TranslationError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranslationError::NetworkError(e.to_string()))?;

        let translated = parse_gtx_response(&body)?;
        log::info!("Translation successful: {} chars", translated.len());
        Ok(translated)
    }
}

/// Extract the translated text from a gtx response body.
///
/// The body is a nested array; each element of the first array is a segment
/// whose first element is the translated text for that segment:
/// `[[["Merhaba","Hallo",...],[" dunya","Welt",...]],null,"de",...]`
fn parse_gtx_response(body: &str) -> Result<String, TranslationError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| TranslationError::ParseError(format!("invalid JSON: {}", e)))?;

    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::ParseError("missing segment array".to_string()))?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(part) = segment.get(0).and_then(Value::as_str) {
            translated.push_str(part);
        }
    }

    if translated.is_empty() {
        return Err(TranslationError::ParseError(
            "response contained no translated text".to_string(),
        ));
    }

    Ok(translated)
}
