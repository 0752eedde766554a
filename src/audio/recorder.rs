//! Fixed-duration audio recorder using CPAL for capture and hound for WAV writing
//!
//! Capture proceeds in fixed-size blocks pulled from a `BlockSource`. The full
//! sample buffer is assembled in memory first and only written to disk once
//! every block has been read, so a failed capture never leaves a file behind.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use hound::{WavSpec, WavWriter};

/// How long a block read waits for the device before giving up.
const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors that can occur during audio recording.
#[derive(Debug, Clone)]
pub enum AudioError {
    NoInputDevice,
    UnsupportedConfig(String),
    StreamCreationFailed(String),
    InvalidConfig(String),
    CaptureInterrupted(String),
    FileCreationFailed(String),
    WriteFailed(String),
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::NoInputDevice => write!(f, "No audio input device found"),
            AudioError::UnsupportedConfig(e) => {
                write!(f, "Requested audio format not supported: {}", e)
            }
            AudioError::StreamCreationFailed(e) => {
                write!(f, "Failed to create audio stream: {}", e)
            }
            AudioError::InvalidConfig(e) => write!(f, "Invalid recording config: {}", e),
            AudioError::CaptureInterrupted(e) => write!(f, "Capture interrupted: {}", e),
            AudioError::FileCreationFailed(e) => write!(f, "Failed to create WAV file: {}", e),
            AudioError::WriteFailed(e) => write!(f, "Failed to write audio data: {}", e),
        }
    }
}

impl std::error::Error for AudioError {}

/// Parameters for one fixed-duration recording.
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Samples per second of the captured mono signal.
    pub sample_rate_hz: u32,
    /// Samples pulled from the device per block read.
    pub block_size: usize,
    /// Requested recording length. The actual length is rounded down to a
    /// whole number of blocks.
    pub duration_secs: f64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44_100,
            block_size: 1024,
            duration_secs: 10.0,
        }
    }
}

impl RecordingConfig {
    /// Number of full blocks that fit in the requested duration.
    pub fn block_count(&self) -> usize {
        ((self.sample_rate_hz as f64 * self.duration_secs) / self.block_size as f64).floor()
            as usize
    }

    fn validate(&self) -> Result<(), AudioError> {
        if self.sample_rate_hz == 0 {
            return Err(AudioError::InvalidConfig("sample rate must be > 0".into()));
        }
        if self.block_size == 0 {
            return Err(AudioError::InvalidConfig("block size must be > 0".into()));
        }
        if !(self.duration_secs > 0.0) {
            return Err(AudioError::InvalidConfig("duration must be > 0".into()));
        }
        Ok(())
    }
}

/// A blocking source of fixed-size sample blocks.
///
/// `read_block` blocks the calling thread until `buf` has been filled (or the
/// source fails). Dropping the source releases the underlying device, so a
/// caller that drops it before writing any file guarantees the device is free
/// on every exit path.
pub trait BlockSource {
    /// Sample rate of the delivered mono signal.
    fn sample_rate(&self) -> u32;

    /// Fill `buf` with the next consecutive samples.
    /// Returns the number of samples written, which is `buf.len()` unless the
    /// source is exhausted or failed.
    fn read_block(&mut self, buf: &mut [i16]) -> Result<usize, AudioError>;
}

/// `BlockSource` backed by the system's default input device.
///
/// The CPAL callback converts incoming samples to i16 and feeds them through
/// a channel; `read_block` drains that channel. The stream is already playing
/// when `open` returns, so samples accumulate while the reader catches up.
pub struct MicSource {
    _stream: Stream,
    rx: Receiver<i16>,
    sample_rate: u32,
}

impl MicSource {
    /// Open the default input device for mono capture at the requested rate.
    pub fn open(config: &RecordingConfig) -> Result<Self, AudioError> {
        config.validate()?;

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AudioError::NoInputDevice)?;

        log::info!("Using audio input device: {:?}", device.name());

        let sample_format = device
            .default_input_config()
            .map_err(|e| AudioError::UnsupportedConfig(e.to_string()))?
            .sample_format();

        // The device is asked for the exact layout the WAV file will carry:
        // one channel at the caller's sample rate. Backends that cannot
        // deliver it reject the stream; no resampling is attempted.
        let stream_config = StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(config.sample_rate_hz),
            buffer_size: cpal::BufferSize::Default,
        };

        let (tx, rx) = mpsc::channel();
        let stream = build_stream(&device, &stream_config, sample_format, tx)?;

        stream.play().map_err(|e| {
            AudioError::StreamCreationFailed(format!("Failed to start stream: {}", e))
        })?;

        log::info!(
            "Capture started: {} Hz, 1 channel, {:?} source format",
            config.sample_rate_hz,
            sample_format
        );

        Ok(Self {
            _stream: stream,
            rx,
            sample_rate: config.sample_rate_hz,
        })
    }
}

impl BlockSource for MicSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read_block(&mut self, buf: &mut [i16]) -> Result<usize, AudioError> {
        for slot in buf.iter_mut() {
            *slot = self.rx.recv_timeout(RECV_TIMEOUT).map_err(|e| {
                AudioError::CaptureInterrupted(format!("device stopped delivering samples: {}", e))
            })?;
        }
        Ok(buf.len())
    }
}

fn build_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    tx: Sender<i16>,
) -> Result<Stream, AudioError> {
    let err_fn = |err| log::error!("Audio stream error: {}", err);

    match sample_format {
        SampleFormat::I16 => build_stream_typed::<i16>(device, config, tx, err_fn),
        SampleFormat::U16 => build_stream_typed::<u16>(device, config, tx, err_fn),
        SampleFormat::F32 => build_stream_typed::<f32>(device, config, tx, err_fn),
        other => Err(AudioError::UnsupportedConfig(format!(
            "sample format {:?}",
            other
        ))),
    }
}

fn build_stream_typed<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    tx: Sender<i16>,
    err_fn: impl FnMut(cpal::StreamError) + Send + 'static,
) -> Result<Stream, AudioError>
where
    T: cpal::Sample<Float = f32> + cpal::SizedSample + Send + 'static,
{
    let stream = device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                for &sample in data {
                    // Send fails only when the reader is gone, which means
                    // the recording already ended; stop forwarding.
                    if tx.send(sample_to_i16(sample)).is_err() {
                        return;
                    }
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| AudioError::StreamCreationFailed(e.to_string()))?;

    Ok(stream)
}

/// Convert any sample type to i16 for WAV writing.
fn sample_to_i16<T: cpal::Sample<Float = f32>>(sample: T) -> i16 {
    let f32_sample: f32 = sample.to_float_sample();
    let clamped = f32_sample.clamp(-1.0, 1.0);
    (clamped * i16::MAX as f32) as i16
}

/// Record `config.duration_secs` of audio from `source` into a WAV at `path`.
///
/// The source is dropped (device released) before the file is touched, on
/// success and failure alike. Any short or failed block read aborts the
/// capture and no file is written.
pub fn record_to_wav<S: BlockSource>(
    mut source: S,
    path: &Path,
    config: &RecordingConfig,
) -> Result<PathBuf, AudioError> {
    config.validate()?;

    if source.sample_rate() != config.sample_rate_hz {
        log::warn!(
            "Source delivers {} Hz but the file will declare {} Hz",
            source.sample_rate(),
            config.sample_rate_hz
        );
    }

    let captured = read_all_blocks(&mut source, config);
    drop(source);

    let samples = captured?;
    log::info!(
        "Captured {} samples ({} blocks of {})",
        samples.len(),
        config.block_count(),
        config.block_size
    );

    write_wav(path, &samples, config.sample_rate_hz)?;
    log::info!("Recording finished, WAV written: {:?}", path);
    Ok(path.to_path_buf())
}

/// Record from the default input device. Convenience wrapper around
/// [`MicSource::open`] + [`record_to_wav`].
pub fn record(path: &Path, config: &RecordingConfig) -> Result<PathBuf, AudioError> {
    let source = MicSource::open(config)?;
    record_to_wav(source, path, config)
}

fn read_all_blocks<S: BlockSource>(
    source: &mut S,
    config: &RecordingConfig,
) -> Result<Vec<i16>, AudioError> {
    let block_count = config.block_count();
    let mut samples = Vec::with_capacity(block_count * config.block_size);
    let mut block = vec![0i16; config.block_size];

    for _ in 0..block_count {
        let n = source.read_block(&mut block)?;
        if n < block.len() {
            return Err(AudioError::CaptureInterrupted(format!(
                "short read: got {} of {} samples",
                n,
                block.len()
            )));
        }
        samples.extend_from_slice(&block);
    }

    Ok(samples)
}

/// Write mono 16-bit PCM samples as a WAV file at `path`.
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<(), AudioError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer =
        WavWriter::create(path, spec).map_err(|e| AudioError::FileCreationFailed(e.to_string()))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| AudioError::WriteFailed(e.to_string()))?;
    }

    writer
        .finalize()
        .map_err(|e| AudioError::WriteFailed(e.to_string()))?;

    Ok(())
}
