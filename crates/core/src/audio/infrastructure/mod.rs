pub mod google_translator;
pub mod gtts_synthesizer;
pub mod phase_vocoder_stretcher;
pub mod whisper_recognizer;
