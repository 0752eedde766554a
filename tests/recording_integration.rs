//! Integration tests for the audio recording pipeline
//!
//! These run against a deterministic fake `BlockSource`, so they need no
//! microphone and no audio backend. They cover the WAV header contract, the
//! exact sample-count invariant, byte-for-byte read-back fidelity, and the
//! failure paths (short reads, device errors, unwritable destinations).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use vox_relay::audio::{record_to_wav, AudioError, BlockSource, RecordingConfig};

/// What the fake device should do on a given block read.
enum Fault {
    None,
    /// Return fewer samples than requested at this block index.
    ShortReadAt(usize),
    /// Fail outright at this block index.
    ErrorAt(usize),
}

/// Deterministic fake input device.
///
/// Produces a wrapping sample counter (0, 1, 2, ...) so read-back tests can
/// reconstruct the exact expected sequence. Sets `released` on drop, standing
/// in for the real device teardown.
struct FakeSource {
    sample_rate: u32,
    next_sample: i16,
    blocks_read: usize,
    fault: Fault,
    released: Arc<AtomicBool>,
}

impl FakeSource {
    fn new(sample_rate: u32) -> (Self, Arc<AtomicBool>) {
        let released = Arc::new(AtomicBool::new(false));
        let source = Self {
            sample_rate,
            next_sample: 0,
            blocks_read: 0,
            fault: Fault::None,
            released: released.clone(),
        };
        (source, released)
    }

    fn with_fault(sample_rate: u32, fault: Fault) -> (Self, Arc<AtomicBool>) {
        let (mut source, released) = Self::new(sample_rate);
        source.fault = fault;
        (source, released)
    }
}

impl Drop for FakeSource {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

impl BlockSource for FakeSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read_block(&mut self, buf: &mut [i16]) -> Result<usize, AudioError> {
        let index = self.blocks_read;
        self.blocks_read += 1;

        match self.fault {
            Fault::ErrorAt(at) if index == at => {
                return Err(AudioError::CaptureInterrupted(
                    "simulated device failure".to_string(),
                ));
            }
            Fault::ShortReadAt(at) if index == at => {
                let n = buf.len() - 1;
                for slot in buf[..n].iter_mut() {
                    *slot = self.next_sample;
                    self.next_sample = self.next_sample.wrapping_add(1);
                }
                return Ok(n);
            }
            _ => {}
        }

        for slot in buf.iter_mut() {
            *slot = self.next_sample;
            self.next_sample = self.next_sample.wrapping_add(1);
        }
        Ok(buf.len())
    }
}

fn read_wav(path: &Path) -> (hound::WavSpec, Vec<i16>) {
    let mut reader = hound::WavReader::open(path).expect("open written WAV");
    let spec = reader.spec();
    let samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<Result<_, _>>()
        .expect("decode samples");
    (spec, samples)
}

// ============================================================================
// Success paths
// ============================================================================

#[test]
fn one_second_at_44100_yields_43_full_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");

    let config = RecordingConfig {
        sample_rate_hz: 44_100,
        block_size: 1024,
        duration_secs: 1.0,
    };
    let (source, released) = FakeSource::new(config.sample_rate_hz);

    let out = record_to_wav(source, &path, &config).expect("recording should succeed");
    assert_eq!(out, path);
    assert!(released.load(Ordering::SeqCst), "device must be released");

    let (spec, samples) = read_wav(&path);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 44_100);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);

    // floor(44100 / 1024) = 43 blocks, truncated to whole blocks
    assert_eq!(samples.len(), 43 * 1024);
}

#[test]
fn header_reflects_requested_sample_rate() {
    let dir = tempfile::tempdir().unwrap();

    for rate in [8_000u32, 16_000, 22_050, 48_000] {
        let path = dir.path().join(format!("clip_{}.wav", rate));
        let config = RecordingConfig {
            sample_rate_hz: rate,
            block_size: 256,
            duration_secs: 0.25,
        };
        let (source, _released) = FakeSource::new(rate);

        record_to_wav(source, &path, &config).expect("recording should succeed");

        let (spec, samples) = read_wav(&path);
        assert_eq!(spec.sample_rate, rate);
        assert_eq!(spec.channels, 1);
        assert_eq!(samples.len(), config.block_count() * config.block_size);
    }
}

#[test]
fn read_back_reproduces_captured_samples_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");

    let config = RecordingConfig {
        sample_rate_hz: 8_000,
        block_size: 512,
        duration_secs: 0.5,
    };
    let (source, _released) = FakeSource::new(config.sample_rate_hz);

    record_to_wav(source, &path, &config).expect("recording should succeed");

    let (_, samples) = read_wav(&path);
    let expected: Vec<i16> = (0..samples.len() as i32).map(|i| i as i16).collect();
    assert_eq!(samples, expected, "lossless round trip");
}

#[test]
fn existing_file_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");
    std::fs::write(&path, b"stale bytes from a previous run").unwrap();

    let config = RecordingConfig {
        sample_rate_hz: 8_000,
        block_size: 512,
        duration_secs: 0.5,
    };
    let (source, _released) = FakeSource::new(config.sample_rate_hz);

    record_to_wav(source, &path, &config).expect("recording should succeed");

    let (spec, samples) = read_wav(&path);
    assert_eq!(spec.sample_rate, 8_000);
    assert_eq!(samples.len(), 7 * 512);
}

// ============================================================================
// Failure paths
// ============================================================================

#[test]
fn short_read_fails_and_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");

    let config = RecordingConfig {
        sample_rate_hz: 44_100,
        block_size: 1024,
        duration_secs: 1.0,
    };
    let (source, released) = FakeSource::with_fault(config.sample_rate_hz, Fault::ShortReadAt(5));

    let result = record_to_wav(source, &path, &config);

    assert!(
        matches!(result, Err(AudioError::CaptureInterrupted(_))),
        "expected CaptureInterrupted, got: {:?}",
        result
    );
    assert!(!path.exists(), "no partial file may be written");
    assert!(
        released.load(Ordering::SeqCst),
        "device must be released even on failure"
    );
}

#[test]
fn device_error_fails_and_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");

    let config = RecordingConfig {
        sample_rate_hz: 16_000,
        block_size: 256,
        duration_secs: 2.0,
    };
    let (source, released) = FakeSource::with_fault(config.sample_rate_hz, Fault::ErrorAt(0));

    let result = record_to_wav(source, &path, &config);

    assert!(matches!(result, Err(AudioError::CaptureInterrupted(_))));
    assert!(!path.exists());
    assert!(released.load(Ordering::SeqCst));
}

#[test]
fn unwritable_destination_fails_after_device_release() {
    // Parent directory does not exist, so WAV creation must fail
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("missing_subdir").join("clip.wav");

    let config = RecordingConfig {
        sample_rate_hz: 8_000,
        block_size: 512,
        duration_secs: 0.5,
    };
    let (source, released) = FakeSource::new(config.sample_rate_hz);

    let result = record_to_wav(source, &path, &config);

    assert!(
        matches!(result, Err(AudioError::FileCreationFailed(_))),
        "expected FileCreationFailed, got: {:?}",
        result
    );
    assert!(!path.exists());
    assert!(
        released.load(Ordering::SeqCst),
        "capture succeeded, so the device must have been released before the write"
    );
}

#[test]
fn invalid_config_is_rejected_before_any_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");

    let config = RecordingConfig {
        sample_rate_hz: 44_100,
        block_size: 1024,
        duration_secs: -1.0,
    };
    let (source, _released) = FakeSource::new(config.sample_rate_hz);

    let result = record_to_wav(source, &path, &config);
    assert!(matches!(result, Err(AudioError::InvalidConfig(_))));
    assert!(!path.exists());
}
