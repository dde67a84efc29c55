use crate::audio::domain::audio_clip::AudioClip;
use crate::shared::error::DubError;
use crate::video::domain::video_slice::VideoSlice;

/// A duration-matched (video slice, audio clip) pair for one segment,
/// ready for final assembly. The resynchronizer guarantees the two
/// durations agree within the per-segment tolerance before constructing
/// one.
#[derive(Clone, Debug)]
pub struct TimelineUnit {
    pub video: VideoSlice,
    pub audio: AudioClip,
}

impl TimelineUnit {
    pub fn new(video: VideoSlice, audio: AudioClip) -> Self {
        Self { video, audio }
    }

    /// The unit's contribution to the output timeline (video-side).
    pub fn duration(&self) -> f64 {
        self.video.duration()
    }
}

/// The ordered, gapless sequence of timeline units for a whole run.
#[derive(Clone, Debug)]
pub struct OutputTimeline {
    units: Vec<TimelineUnit>,
}

impl OutputTimeline {
    pub fn units(&self) -> &[TimelineUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Total output duration: the sum of unit durations, exactly.
    pub fn total_duration(&self) -> f64 {
        self.units.iter().map(|u| u.duration()).sum()
    }

    /// Concatenate every unit's audio into one continuous track.
    pub fn concat_audio(&self) -> AudioClip {
        let sample_rate = self
            .units
            .first()
            .map(|u| u.audio.sample_rate())
            .unwrap_or(0);
        let mut track = AudioClip::empty(sample_rate);
        for unit in &self.units {
            track.append(&unit.audio);
        }
        track
    }
}

/// Concatenates per-segment units into one continuous output timeline.
///
/// No cross-fades and no gap-filling: units are contiguous by
/// construction, so the only job here is ordering-preserving
/// concatenation plus a cumulative-drift check. A violation signals a
/// systemic bug upstream, never something to patch over.
pub struct TimelineAssembler {
    epsilon: f64,
}

impl TimelineAssembler {
    /// `epsilon` is the per-unit sync tolerance; the assembled timeline
    /// may accumulate at most `units.len() * epsilon` of video/audio
    /// divergence.
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    pub fn assemble(&self, units: Vec<TimelineUnit>) -> Result<OutputTimeline, DubError> {
        if units.is_empty() {
            return Err(DubError::TimelineAssembly(
                "no timeline units to assemble".into(),
            ));
        }

        let sample_rate = units[0].audio.sample_rate();
        if units.iter().any(|u| u.audio.sample_rate() != sample_rate) {
            return Err(DubError::TimelineAssembly(
                "timeline units have mismatched audio sample rates".into(),
            ));
        }

        let total_video: f64 = units.iter().map(|u| u.video.duration()).sum();
        let total_audio: f64 = units.iter().map(|u| u.audio.duration()).sum();
        let tolerance = self.epsilon * units.len() as f64;
        let drift = (total_video - total_audio).abs();
        if drift > tolerance {
            return Err(DubError::TimelineAssembly(format!(
                "video track ({total_video:.4}s) and audio track ({total_audio:.4}s) \
                 diverged by {drift:.4}s, beyond cumulative tolerance {tolerance:.4}s"
            )));
        }

        Ok(OutputTimeline { units })
    }
}
