//! Audio capture module for vox-relay
//!
//! This module handles microphone input capture and WAV file writing.
//! Uses CPAL for audio capture and hound for WAV encoding.

mod paths;
pub mod recorder;

pub use paths::{cleanup_old_recordings, create_temp_audio_dir, generate_wav_path};
pub use recorder::{
    record, record_to_wav, write_wav, AudioError, BlockSource, MicSource, RecordingConfig,
};
