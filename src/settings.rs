//! Runtime settings for vox-relay
//!
//! Settings live in an optional JSON file under the user config directory.
//! Every field has a default, so a missing or partial file always yields a
//! usable configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::audio::RecordingConfig;

const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How long each recording runs, in seconds.
    pub duration_secs: f64,

    /// Sample rate of the captured audio and the produced WAV file.
    pub sample_rate_hz: u32,

    /// Samples pulled from the device per block read.
    pub block_size: usize,

    /// Language spoken into the microphone (ISO 639-1).
    pub source_lang: String,

    /// Language the transcript is translated into (ISO 639-1).
    pub target_lang: String,

    /// OpenAI model used for transcription.
    pub whisper_model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            duration_secs: 10.0,
            sample_rate_hz: 44_100,
            block_size: 1024,
            source_lang: "de".to_string(),
            target_lang: "tr".to_string(),
            whisper_model: "whisper-1".to_string(),
        }
    }
}

impl Settings {
    pub fn recording_config(&self) -> RecordingConfig {
        RecordingConfig {
            sample_rate_hz: self.sample_rate_hz,
            block_size: self.block_size,
            duration_secs: self.duration_secs,
        }
    }
}

/// Default settings file location: ~/.config/vox-relay/settings.json
pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vox-relay").join(SETTINGS_FILE_NAME))
}

/// Load settings from `path`, falling back to defaults when the file is
/// missing, unreadable, or malformed. A bad settings file never aborts a run.
pub fn load_settings(path: &Path) -> Settings {
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<Settings>(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Settings: failed to parse {:?}: {}", path, e);
                Settings::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
        Err(e) => {
            log::warn!("Settings: failed to read {:?}: {}", path, e);
            Settings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory {:?}: {}", parent, e))?;
    }

    let contents =
        serde_json::to_string_pretty(settings).map_err(|e| format!("Serialize settings: {}", e))?;

    // Write atomically: write to a temp file in the same directory, then rename.
    // This prevents partial/corrupt settings.json if the process dies mid-write.
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &contents)
        .map_err(|e| format!("Write temp settings {:?}: {}", tmp_path, e))?;

    // On Unix, rename will atomically replace the destination. On Windows, rename
    // fails if the destination exists, so we remove it first (ignoring NotFound).
    if cfg!(windows) {
        if path.exists() {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    return Err(format!("Remove existing settings file {:?}: {}", path, e));
                }
            }
        }
    }

    std::fs::rename(&tmp_path, path)
        .map_err(|e| format!("Rename temp settings {:?} to {:?}: {}", tmp_path, path, e))?;
    Ok(())
}
