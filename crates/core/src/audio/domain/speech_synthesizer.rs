use super::audio_clip::AudioClip;
use crate::shared::error::SendError;

/// Domain interface for text-to-speech synthesis.
///
/// The returned clip has no timing relationship to any source segment;
/// fitting it into a slot is the resynchronizer's job.
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(&self, text: &str, lang: &str) -> Result<AudioClip, SendError>;
}
