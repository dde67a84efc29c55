use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;

use redub_core::audio::infrastructure::google_translator::GoogleTranslator;
use redub_core::audio::infrastructure::gtts_synthesizer::GttsSynthesizer;
use redub_core::audio::infrastructure::phase_vocoder_stretcher::PhaseVocoderStretcher;
use redub_core::audio::infrastructure::whisper_recognizer::WhisperRecognizer;
use redub_core::pipeline::dub_video_use_case::{DubOptions, DubVideoUseCase};
use redub_core::pipeline::infrastructure::threaded_segment_executor::ThreadedSegmentExecutor;
use redub_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use redub_core::shared::constants::{WHISPER_MODEL_NAME, WHISPER_MODEL_URL};
use redub_core::shared::model_resolver;
use redub_core::video::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use redub_core::video::infrastructure::ffmpeg_prober::FfmpegProber;
use redub_core::video::infrastructure::ffmpeg_timeline_muxer::FfmpegTimelineMuxer;

/// Re-dub a video's speech into another language.
#[derive(Parser)]
#[command(name = "redub")]
struct Cli {
    /// Input video file.
    input: PathBuf,

    /// Output video file.
    output: PathBuf,

    /// Source speech language code.
    #[arg(long, default_value = "en")]
    source_lang: String,

    /// Target dub language code.
    #[arg(long, default_value = "hi")]
    target_lang: String,

    /// Speed synthesized speech up by this rate before fitting (1.0 = off).
    #[arg(long, default_value = "1.1")]
    speaking_rate: f64,

    /// Worker threads for per-segment processing (0 = auto).
    #[arg(long, default_value = "0")]
    workers: usize,

    /// H.264 CRF quality (0=lossless, 51=worst, default 18).
    #[arg(long)]
    quality: Option<u32>,

    /// Path to a local whisper ggml model (skips the download).
    #[arg(long)]
    model: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    validate(&cli)?;

    log::info!("Resolving model: {WHISPER_MODEL_NAME}");
    let model_path = model_resolver::resolve(
        WHISPER_MODEL_NAME,
        WHISPER_MODEL_URL,
        cli.model.as_deref(),
        Some(Box::new(download_progress)),
    )?;
    eprintln!();

    let recognizer = WhisperRecognizer::new(&model_path, &cli.source_lang)?;
    let translator = GoogleTranslator::new()?;
    let synthesizer = GttsSynthesizer::new(Box::new(FfmpegAudioReader))?;
    let muxer = match cli.quality {
        Some(crf) => FfmpegTimelineMuxer::new().with_crf(crf),
        None => FfmpegTimelineMuxer::new(),
    };

    let progress: Box<dyn Fn(usize, usize) -> bool + Send> = Box::new(|current, total| {
        eprint!("\rDubbing segment {current}/{total}");
        true
    });

    let mut use_case = DubVideoUseCase::new(
        Box::new(FfmpegProber),
        Box::new(FfmpegAudioReader),
        Box::new(recognizer),
        Box::new(translator),
        Box::new(synthesizer),
        Box::new(PhaseVocoderStretcher::new()),
        Box::new(muxer),
        Box::new(ThreadedSegmentExecutor::new()),
        Box::new(StdoutPipelineLogger::default()),
    );

    let options = DubOptions {
        source_lang: cli.source_lang,
        target_lang: cli.target_lang,
        speaking_rate: cli.speaking_rate,
        workers: cli.workers,
        on_progress: Some(progress),
        cancelled: Arc::new(AtomicBool::new(false)),
    };

    let report = use_case.execute(&cli.input, &cli.output, options)?;
    eprintln!();
    log::info!(
        "Dubbed {} segments; output {:.2}s (source {:.2}s), written to {}",
        report.segments,
        report.output_duration,
        report.source_duration,
        cli.output.display()
    );

    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !cli.speaking_rate.is_finite() || cli.speaking_rate <= 0.0 || cli.speaking_rate > 4.0 {
        return Err(format!(
            "Speaking rate must be in (0, 4], got {}",
            cli.speaking_rate
        )
        .into());
    }
    if let Some(q) = cli.quality {
        if q > 51 {
            return Err(format!("Quality (CRF) must be 0-51, got {q}").into());
        }
    }
    if cli.source_lang.is_empty() || cli.target_lang.is_empty() {
        return Err("Language codes must not be empty".into());
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading speech recognition model... {pct}%");
    } else {
        eprint!("\rDownloading speech recognition model... {downloaded} bytes");
    }
}
