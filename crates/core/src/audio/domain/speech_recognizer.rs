use super::audio_clip::AudioClip;
use super::transcript::TranscriptSegment;
use crate::shared::error::SendError;

/// Domain interface for speech-to-text transcription.
///
/// Implementations run inference on audio to produce timestamped segments
/// in non-decreasing start order.
pub trait SpeechRecognizer: Send + Sync {
    fn transcribe(&self, audio: &AudioClip) -> Result<Vec<TranscriptSegment>, SendError>;
}
