pub mod audio_clip;
pub mod speech_recognizer;
pub mod speech_synthesizer;
pub mod time_stretcher;
pub mod transcript;
pub mod translator;
