use std::path::Path;

use crate::shared::error::SendError;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_prober::VideoProber;

/// Reads container metadata via ffmpeg-next (libavformat) without
/// decoding any frames.
pub struct FfmpegProber;

impl VideoProber for FfmpegProber {
    fn probe(&self, path: &Path) -> Result<VideoMetadata, SendError> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        // Container duration is in AV_TIME_BASE (microsecond) units
        let duration = if ictx.duration() > 0 {
            ictx.duration() as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE)
        } else {
            0.0
        };

        Ok(VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            total_frames: stream.frames().max(0) as usize,
            duration,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_nonexistent_raises() {
        let prober = FfmpegProber;
        assert!(prober.probe(Path::new("/nonexistent/test.mp4")).is_err());
    }
}
