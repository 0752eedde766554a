//! vox-relay: record speech, transcribe it, translate the transcript.
//!
//! The pipeline has three stages behind narrow traits (see [`pipeline`]):
//! a blocking microphone recorder that writes a mono 16-bit WAV file, the
//! OpenAI Whisper API for transcription, and the Google Translate gtx
//! endpoint for translation.

pub mod audio;
pub mod pipeline;
pub mod settings;
pub mod transcription;
pub mod translation;

pub use pipeline::{run, MicRecorder, PipelineError, PipelineOutput};
pub use settings::Settings;
