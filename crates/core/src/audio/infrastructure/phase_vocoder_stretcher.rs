use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::f64::consts::PI;

use crate::audio::domain::audio_clip::AudioClip;
use crate::audio::domain::time_stretcher::TimeStretcher;
use crate::shared::error::DubError;

/// STFT analysis/synthesis window size.
const WINDOW_SIZE: usize = 2048;

/// Hop size between successive synthesis frames.
const SYNTHESIS_HOP: usize = 512;

/// Phase vocoder time stretcher.
///
/// Changes a clip's duration by `1 / rate` without shifting pitch:
/// STFT with an analysis hop of `rate * SYNTHESIS_HOP`, per-bin
/// instantaneous frequency estimation, phase-accumulated resynthesis at
/// the fixed synthesis hop, ISTFT with overlap-add.
pub struct PhaseVocoderStretcher;

impl PhaseVocoderStretcher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PhaseVocoderStretcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeStretcher for PhaseVocoderStretcher {
    fn stretch(&self, clip: &AudioClip, rate: f64) -> Result<AudioClip, DubError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(DubError::Stretch(format!(
                "rate must be finite and > 0, got {rate}"
            )));
        }
        if clip.is_empty() {
            return Err(DubError::Stretch("cannot stretch an empty clip".into()));
        }
        if clip.sample_rate() == 0 {
            return Err(DubError::Stretch("sample rate must be > 0".into()));
        }

        let samples = clip.samples();
        let n = samples.len();
        let out_len = ((n as f64 / rate).round() as usize).max(1);

        // Clips shorter than one analysis window carry no frame structure
        // to vocode; plain linear resampling keeps the duration contract.
        if n < WINDOW_SIZE {
            return Ok(AudioClip::new(
                resample_linear(samples, out_len),
                clip.sample_rate(),
            ));
        }

        let analysis_hop = SYNTHESIS_HOP as f64 * rate;
        let half_window = WINDOW_SIZE / 2 + 1;

        let hann: Vec<f64> = (0..WINDOW_SIZE)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / WINDOW_SIZE as f64).cos()))
            .collect();

        let num_frames = ((n - WINDOW_SIZE) as f64 / analysis_hop).floor() as usize + 1;
        let buf_len = out_len.max((num_frames - 1) * SYNTHESIS_HOP + WINDOW_SIZE);

        let mut output = vec![0.0f64; buf_len];
        let mut window_sum = vec![0.0f64; buf_len];

        let mut planner = FftPlanner::<f64>::new();
        let fft_forward = planner.plan_fft_forward(WINDOW_SIZE);
        let fft_inverse = planner.plan_fft_inverse(WINDOW_SIZE);

        let mut prev_phase = vec![0.0f64; half_window];
        let mut synth_phase = vec![0.0f64; half_window];

        // Expected per-bin phase advance over one (fractional) analysis hop
        let expected_advance: Vec<f64> = (0..half_window)
            .map(|k| 2.0 * PI * k as f64 * analysis_hop / WINDOW_SIZE as f64)
            .collect();

        for frame_idx in 0..num_frames {
            let start = (frame_idx as f64 * analysis_hop).floor() as usize;
            let start = start.min(n - WINDOW_SIZE);

            // Analysis: window the input frame and FFT
            let mut fft_buf: Vec<Complex<f64>> = (0..WINDOW_SIZE)
                .map(|i| Complex::new(samples[start + i] as f64 * hann[i], 0.0))
                .collect();
            fft_forward.process(&mut fft_buf);

            let magnitudes: Vec<f64> = fft_buf[..half_window].iter().map(|c| c.norm()).collect();
            let phases: Vec<f64> = fft_buf[..half_window]
                .iter()
                .map(|c| c.im.atan2(c.re))
                .collect();

            if frame_idx == 0 {
                synth_phase.copy_from_slice(&phases);
            } else {
                // Instantaneous frequency per analysis hop, then rescaled
                // to the synthesis hop to accumulate the output phase
                for k in 0..half_window {
                    let diff = phases[k] - prev_phase[k] - expected_advance[k];
                    let wrapped = diff - (2.0 * PI) * (diff / (2.0 * PI)).round();
                    let advance = expected_advance[k] + wrapped;
                    synth_phase[k] += advance / rate;
                }
            }
            prev_phase.copy_from_slice(&phases);

            // Reconstruct complex spectrum from magnitude + accumulated phase
            let mut synth_buf: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); WINDOW_SIZE];
            for k in 0..half_window {
                synth_buf[k] = Complex::from_polar(magnitudes[k], synth_phase[k]);
            }
            // Mirror for negative frequencies (conjugate symmetry for real output)
            for k in 1..half_window - 1 {
                synth_buf[WINDOW_SIZE - k] = synth_buf[k].conj();
            }

            fft_inverse.process(&mut synth_buf);

            // rustfft does not normalize the inverse transform
            let norm = 1.0 / WINDOW_SIZE as f64;
            let out_start = frame_idx * SYNTHESIS_HOP;
            for i in 0..WINDOW_SIZE {
                let pos = out_start + i;
                if pos < buf_len {
                    output[pos] += synth_buf[i].re * norm * hann[i];
                    window_sum[pos] += hann[i] * hann[i];
                }
            }
        }

        // Normalize by window sum to compensate overlap-add; fade edge
        // regions where coverage is too thin to trust
        let max_window_sum = window_sum.iter().cloned().fold(0.0f64, f64::max);
        let ws_threshold = max_window_sum * 0.1;
        for i in 0..buf_len {
            if window_sum[i] >= ws_threshold {
                output[i] /= window_sum[i];
            } else {
                output[i] = 0.0;
            }
        }

        let mut out_samples: Vec<f32> = output.iter().take(out_len).map(|&v| v as f32).collect();
        out_samples.resize(out_len, 0.0);

        Ok(AudioClip::new(out_samples, clip.sample_rate()))
    }
}

/// Linear-interpolation resample to an exact output length.
fn resample_linear(samples: &[f32], out_len: usize) -> Vec<f32> {
    let n = samples.len();
    if n == 1 {
        return vec![samples[0]; out_len];
    }
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * (n - 1) as f64 / (out_len.max(2) - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = pos - lo as f64;
            (samples[lo] as f64 * (1.0 - frac) + samples[hi] as f64 * frac) as f32
        })
        .collect()
}
