/// A clip of decoded mono audio: PCM samples normalized to [-1.0, 1.0].
///
/// Every producer in the pipeline (track extraction, TTS decode, stretch)
/// works in mono, so channel count is not carried.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioClip {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// An empty clip, useful as a concatenation seed.
    pub fn empty(sample_rate: u32) -> Self {
        Self::new(Vec::new(), sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds, derived from the sample count.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Append another clip's samples. Both clips must share a sample rate;
    /// the assembler guarantees this by construction.
    pub fn append(&mut self, other: &AudioClip) {
        debug_assert_eq!(self.sample_rate, other.sample_rate);
        self.samples.extend_from_slice(&other.samples);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_creates_clip_with_correct_fields() {
        let samples = vec![0.0f32; 16000];
        let clip = AudioClip::new(samples.clone(), 16000);
        assert_eq!(clip.samples(), &samples[..]);
        assert_eq!(clip.sample_rate(), 16000);
    }

    #[test]
    fn test_duration() {
        let clip = AudioClip::new(vec![0.0; 48000], 16000);
        assert_relative_eq!(clip.duration(), 3.0);
    }

    #[test]
    fn test_duration_zero_rate_is_zero() {
        let clip = AudioClip::new(vec![0.0; 100], 0);
        assert_eq!(clip.duration(), 0.0);
    }

    #[test]
    fn test_empty() {
        let clip = AudioClip::empty(24000);
        assert!(clip.is_empty());
        assert_eq!(clip.duration(), 0.0);
    }

    #[test]
    fn test_append_concatenates_samples() {
        let mut a = AudioClip::new(vec![0.1; 100], 16000);
        let b = AudioClip::new(vec![0.2; 50], 16000);
        a.append(&b);
        assert_eq!(a.samples().len(), 150);
        assert_eq!(a.samples()[100], 0.2);
    }
}
