use std::path::Path;

use crate::shared::error::SendError;
use crate::shared::video_metadata::VideoMetadata;

/// Domain interface for reading container metadata without decoding frames.
pub trait VideoProber: Send + Sync {
    fn probe(&self, path: &Path) -> Result<VideoMetadata, SendError>;
}
