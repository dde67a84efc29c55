use std::path::Path;

use crate::dubbing::domain::timeline::OutputTimeline;
use crate::shared::error::SendError;

/// Domain interface for rendering an assembled timeline into a muxed
/// video file.
///
/// Implementations re-encode the source's video frames according to each
/// unit's slice span and speed factor, encode the concatenated audio
/// track, and must not leave a final output file behind on failure.
pub trait TimelineMuxer: Send + Sync {
    fn mux(
        &self,
        source: &Path,
        timeline: &OutputTimeline,
        output: &Path,
    ) -> Result<(), SendError>;
}
