use crate::shared::error::DubError;

/// How a synthesized utterance gets fitted to its segment's time span.
///
/// Exactly one of the two always applies; keeping them as a tagged enum
/// makes the mutually exclusive paths explicit at the type level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FitDecision {
    /// Slow the audio down by `ratio` (a playback-rate multiplier < 1 in
    /// practice) so it fills the segment span; video stays untouched.
    StretchAudio { ratio: f64 },
    /// Play the video slice at `factor`× speed so its duration grows to
    /// the utterance's; audio stays untouched.
    ScaleVideo { factor: f64 },
}

/// Decide whether to stretch the audio or scale the video for one segment.
///
/// Stretching speech to fill a longer slot keeps the visual timing
/// intact, which viewers notice less than altered video pacing. When the
/// utterance is the longer of the two, compressing it further would hurt
/// intelligibility, so the video is retimed instead. Near-1 quotients
/// still apply the transform; there is no identity shortcut.
pub fn decide(segment_duration: f64, utterance_duration: f64) -> Result<FitDecision, DubError> {
    if !segment_duration.is_finite()
        || !utterance_duration.is_finite()
        || segment_duration <= 0.0
        || utterance_duration <= 0.0
    {
        return Err(DubError::InvalidDuration {
            segment_duration,
            utterance_duration,
        });
    }

    if utterance_duration <= segment_duration {
        Ok(FitDecision::StretchAudio {
            ratio: utterance_duration / segment_duration,
        })
    } else {
        Ok(FitDecision::ScaleVideo {
            factor: segment_duration / utterance_duration,
        })
    }
}
