//! Transcription module for vox-relay
//!
//! This module handles speech-to-text transcription via OpenAI Whisper API.

mod openai;

pub use openai::{is_api_key_configured, TranscriptionError, WhisperClient};
