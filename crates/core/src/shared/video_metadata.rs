use std::path::PathBuf;

use crate::shared::constants::{FALLBACK_FRAME_EPSILON, MIN_SYNC_EPSILON};

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    /// Container duration in seconds.
    pub duration: f64,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Duration of one video frame, or the 30 fps fallback when unknown.
    pub fn frame_duration(&self) -> f64 {
        if self.fps > 0.0 {
            1.0 / self.fps
        } else {
            FALLBACK_FRAME_EPSILON
        }
    }

    /// Per-segment sync tolerance: one frame, floored at a fixed minimum.
    pub fn sync_epsilon(&self) -> f64 {
        self.frame_duration().max(MIN_SYNC_EPSILON)
    }
}
