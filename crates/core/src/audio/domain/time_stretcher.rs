use super::audio_clip::AudioClip;
use crate::shared::error::DubError;

/// Domain interface for pitch-preserving time stretching.
///
/// `rate` is a playback-rate multiplier: the stretched clip's duration is
/// approximately `clip.duration() / rate` (rate > 1 shortens, rate < 1
/// lengthens), up to one analysis frame of rounding. No clamping is
/// applied here; extreme rates are a caller policy.
pub trait TimeStretcher: Send + Sync {
    fn stretch(&self, clip: &AudioClip, rate: f64) -> Result<AudioClip, DubError>;
}
