use crate::audio::domain::audio_clip::AudioClip;

/// Synthesized speech for one segment's translated text.
///
/// Created once per segment, consumed by the resynchronizer, then
/// discarded. Duration is derived from the clip, never stored.
#[derive(Clone, Debug)]
pub struct SynthesizedUtterance {
    pub segment_index: usize,
    pub audio: AudioClip,
}

impl SynthesizedUtterance {
    pub fn new(segment_index: usize, audio: AudioClip) -> Self {
        Self {
            segment_index,
            audio,
        }
    }

    pub fn duration(&self) -> f64 {
        self.audio.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_duration_derives_from_clip() {
        let utterance = SynthesizedUtterance::new(3, AudioClip::new(vec![0.0; 36000], 24000));
        assert_eq!(utterance.segment_index, 3);
        assert_relative_eq!(utterance.duration(), 1.5);
    }
}
