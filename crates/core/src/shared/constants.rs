pub const WHISPER_MODEL_NAME: &str = "ggml-base.bin";
pub const WHISPER_MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.bin";

/// Whisper expects 16 kHz mono input.
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Sample rate synthesized utterances are decoded to.
pub const TTS_SAMPLE_RATE: u32 = 24000;

/// Google Translate TTS rejects long queries; split on whitespace below this.
pub const TTS_MAX_CHUNK_CHARS: usize = 200;

pub const TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
pub const TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Sync tolerance when the source frame rate is unknown (one frame at 30 fps).
pub const FALLBACK_FRAME_EPSILON: f64 = 1.0 / 30.0;

/// Floor for the sync tolerance, in seconds.
pub const MIN_SYNC_EPSILON: f64 = 0.005;
