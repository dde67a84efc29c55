use std::path::Path;

use crate::audio::domain::audio_clip::AudioClip;
use crate::shared::error::SendError;

/// Domain interface for decoding audio from a media file.
///
/// Used both for the source video's audio track and for decoding fetched
/// TTS payloads (bare MP3 files).
pub trait AudioReader: Send + Sync {
    /// Decode the best audio stream to a mono PCM clip at the given
    /// sample rate. Returns None if the file has no audio stream.
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioClip>, SendError>;
}
