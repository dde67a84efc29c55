use thiserror::Error;

/// Error type collaborators send across thread boundaries.
pub type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Failure taxonomy for a dubbing run.
///
/// All variants are fatal: the pipeline cancels in-flight work and writes
/// no output file. Collaborator failures carry the index of the segment
/// being processed when they occurred.
#[derive(Error, Debug)]
pub enum DubError {
    #[error(
        "invalid durations: segment {segment_duration}s, utterance {utterance_duration}s \
         (both must be finite and > 0)"
    )]
    InvalidDuration {
        segment_duration: f64,
        utterance_duration: f64,
    },

    #[error("audio stretch failed: {0}")]
    Stretch(String),

    #[error(
        "segment {index}: video ({video_duration:.4}s) and audio ({audio_duration:.4}s) \
         diverged beyond tolerance {tolerance:.4}s after fitting"
    )]
    Desync {
        index: usize,
        video_duration: f64,
        audio_duration: f64,
        tolerance: f64,
    },

    #[error("timeline assembly failed: {0}")]
    TimelineAssembly(String),

    #[error("video probe failed: {source}")]
    Probe {
        #[source]
        source: SendError,
    },

    #[error("transcription failed: {source}")]
    Transcription {
        #[source]
        source: SendError,
    },

    #[error("segment {index}: translation failed: {source}")]
    Translation {
        index: usize,
        #[source]
        source: SendError,
    },

    #[error("segment {index}: speech synthesis failed: {source}")]
    Synthesis {
        index: usize,
        #[source]
        source: SendError,
    },

    #[error("mux failed: {source}")]
    Mux {
        #[source]
        source: SendError,
    },

    #[error("segment worker thread panicked")]
    WorkerPanic,

    #[error("dubbing run cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_duration_message_names_both_inputs() {
        let err = DubError::InvalidDuration {
            segment_duration: 3.0,
            utterance_duration: 0.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("3"), "missing segment duration: {msg}");
        assert!(msg.contains("0"), "missing utterance duration: {msg}");
    }

    #[test]
    fn test_collaborator_errors_carry_segment_index() {
        let err = DubError::Translation {
            index: 7,
            source: "timeout".into(),
        };
        assert!(err.to_string().contains("segment 7"));
    }

    #[test]
    fn test_desync_reports_tolerance() {
        let err = DubError::Desync {
            index: 2,
            video_duration: 3.0,
            audio_duration: 3.2,
            tolerance: 0.0333,
        };
        let msg = err.to_string();
        assert!(msg.contains("segment 2"));
        assert!(msg.contains("0.0333"));
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error;
        let err = DubError::Synthesis {
            index: 0,
            source: "http 503".into(),
        };
        assert_eq!(err.source().unwrap().to_string(), "http 503");
    }
}
