use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::audio::domain::speech_synthesizer::SpeechSynthesizer;
use crate::audio::domain::time_stretcher::TimeStretcher;
use crate::audio::domain::translator::Translator;
use crate::dubbing::domain::segment::Segment;
use crate::dubbing::domain::timeline::TimelineUnit;
use crate::shared::error::DubError;
use crate::video::domain::video_slice::VideoSlice;

/// One segment's unit of work: the transcribed span plus the video slice
/// it covers.
#[derive(Clone, Debug)]
pub struct SegmentJob {
    pub segment: Segment,
    pub video: VideoSlice,
}

impl SegmentJob {
    pub fn new(segment: Segment, video: VideoSlice) -> Self {
        Self { segment, video }
    }
}

/// Configuration for one executor run.
pub struct ExecutorConfig {
    /// Worker thread count; 0 lets the executor pick.
    pub workers: usize,
    pub source_lang: String,
    pub target_lang: String,
    /// Synthesis pre-stretch rate applied before duration fitting.
    /// 1.0 disables it.
    pub speaking_rate: f64,
    /// Per-segment sync tolerance, in seconds.
    pub epsilon: f64,
    /// Called after each completed segment; returning `false` cancels
    /// the run.
    pub on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    pub cancelled: Arc<AtomicBool>,
}

/// Abstracts how the per-segment translate → synthesize → fit work is
/// executed.
///
/// This is a port (application-layer interface). Infrastructure provides
/// concrete implementations (e.g. threaded). Results come back ordered by
/// segment index regardless of completion order.
pub trait SegmentExecutor: Send {
    fn execute(
        &self,
        jobs: Vec<SegmentJob>,
        translator: &dyn Translator,
        synthesizer: &dyn SpeechSynthesizer,
        stretcher: &dyn TimeStretcher,
        config: ExecutorConfig,
    ) -> Result<Vec<TimelineUnit>, DubError>;
}
