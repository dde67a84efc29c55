use crate::audio::domain::time_stretcher::TimeStretcher;
use crate::dubbing::domain::duration_fitter::{decide, FitDecision};
use crate::dubbing::domain::segment::Segment;
use crate::dubbing::domain::timeline::TimelineUnit;
use crate::dubbing::domain::utterance::SynthesizedUtterance;
use crate::shared::error::DubError;
use crate::video::domain::video_slice::VideoSlice;

/// Fits one synthesized utterance to its segment's time span.
///
/// Applies the duration fitter's decision — stretch the audio or
/// speed-scale the video — then verifies the resulting pair agrees to
/// within `epsilon` before handing a [`TimelineUnit`] to the assembler.
/// The check guards against upstream rounding drift; a violation is a
/// logic error, not a transient one, so there are no retries.
pub struct SegmentResynchronizer<'a> {
    stretcher: &'a dyn TimeStretcher,
    epsilon: f64,
}

impl<'a> SegmentResynchronizer<'a> {
    /// `epsilon` should be one video frame duration or a fixed audio
    /// tolerance, whichever is larger (see `VideoMetadata::sync_epsilon`).
    pub fn new(stretcher: &'a dyn TimeStretcher, epsilon: f64) -> Self {
        Self { stretcher, epsilon }
    }

    pub fn resynchronize(
        &self,
        segment: &Segment,
        video: VideoSlice,
        utterance: &SynthesizedUtterance,
    ) -> Result<TimelineUnit, DubError> {
        let (video, audio) = match decide(segment.duration(), utterance.duration())? {
            FitDecision::StretchAudio { ratio } => {
                let stretched = self.stretcher.stretch(&utterance.audio, ratio)?;
                (video, stretched)
            }
            FitDecision::ScaleVideo { factor } => {
                (video.speed_scaled(factor), utterance.audio.clone())
            }
        };

        let drift = (video.duration() - audio.duration()).abs();
        if drift >= self.epsilon {
            return Err(DubError::Desync {
                index: segment.index,
                video_duration: video.duration(),
                audio_duration: audio.duration(),
                tolerance: self.epsilon,
            });
        }

        Ok(TimelineUnit::new(video, audio))
    }
}
