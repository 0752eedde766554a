use vox_relay::audio::cleanup_old_recordings;
use vox_relay::pipeline::{self, MicRecorder, PipelineError};
use vox_relay::settings::{self, Settings};
use vox_relay::transcription::WhisperClient;
use vox_relay::translation::GoogleTranslator;

fn main() {
    // Load .env file if present (for development convenience)
    // Silently ignore if not found - production uses system env vars
    let _ = dotenvy::dotenv();

    // The fmt subscriber's log bridge picks up the log:: records emitted
    // throughout the library. RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run() {
        log::error!("Pipeline failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[tokio::main]
async fn run() -> Result<(), PipelineError> {
    let settings = match settings::settings_path() {
        Some(path) => settings::load_settings(&path),
        None => Settings::default(),
    };

    let transcriber = WhisperClient::from_env_with_model(settings.whisper_model.clone())?;
    let translator = GoogleTranslator::new()?;

    println!(
        "Recording for {} seconds... speak now ({} -> {}).",
        settings.duration_secs, settings.source_lang, settings.target_lang
    );

    let output = pipeline::run(&settings, MicRecorder, &transcriber, &translator).await?;

    println!();
    println!("Transcript ({}): {}", settings.source_lang, output.transcript);
    println!("Translation ({}): {}", settings.target_lang, output.translation);

    if let Err(e) = cleanup_old_recordings() {
        log::warn!("Failed to clean up old recordings: {}", e);
    }

    Ok(())
}
