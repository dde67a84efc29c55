use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use crate::audio::domain::speech_recognizer::SpeechRecognizer;
use crate::audio::domain::speech_synthesizer::SpeechSynthesizer;
use crate::audio::domain::time_stretcher::TimeStretcher;
use crate::audio::domain::translator::Translator;
use crate::dubbing::domain::segment::Segment;
use crate::dubbing::domain::timeline::TimelineAssembler;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::segment_executor::{ExecutorConfig, SegmentExecutor, SegmentJob};
use crate::shared::constants::WHISPER_SAMPLE_RATE;
use crate::shared::error::DubError;
use crate::video::domain::audio_reader::AudioReader;
use crate::video::domain::timeline_muxer::TimelineMuxer;
use crate::video::domain::video_prober::VideoProber;
use crate::video::domain::video_slice::VideoSlice;

const DEFAULT_SPEAKING_RATE: f64 = 1.1;

/// Per-run options for a dubbing pass.
pub struct DubOptions {
    pub source_lang: String,
    pub target_lang: String,
    /// Synthesis pre-stretch rate; 1.0 disables it.
    pub speaking_rate: f64,
    /// Worker thread count; 0 lets the executor pick.
    pub workers: usize,
    /// Called after each completed segment; returning `false` cancels
    /// the run.
    pub on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    pub cancelled: Arc<AtomicBool>,
}

impl Default for DubOptions {
    fn default() -> Self {
        Self {
            source_lang: "en".to_string(),
            target_lang: "hi".to_string(),
            speaking_rate: DEFAULT_SPEAKING_RATE,
            workers: 0,
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// What a completed run produced.
#[derive(Clone, Debug)]
pub struct DubReport {
    pub segments: usize,
    pub source_duration: f64,
    pub output_duration: f64,
}

/// Orchestrates the full dubbing pipeline.
///
/// Probe → extract audio → transcribe → normalize segments → fan
/// per-segment work out to the executor → assemble the timeline → mux.
/// Wires domain components together; all real work happens behind the
/// ports, so the orchestration is testable with stubs. A fatal error
/// from any stage cancels in-flight work and leaves no output file.
pub struct DubVideoUseCase {
    prober: Box<dyn VideoProber>,
    audio_reader: Box<dyn AudioReader>,
    recognizer: Box<dyn SpeechRecognizer>,
    translator: Box<dyn Translator>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    stretcher: Box<dyn TimeStretcher>,
    muxer: Box<dyn TimelineMuxer>,
    executor: Box<dyn SegmentExecutor>,
    logger: Box<dyn PipelineLogger>,
}

impl DubVideoUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        prober: Box<dyn VideoProber>,
        audio_reader: Box<dyn AudioReader>,
        recognizer: Box<dyn SpeechRecognizer>,
        translator: Box<dyn Translator>,
        synthesizer: Box<dyn SpeechSynthesizer>,
        stretcher: Box<dyn TimeStretcher>,
        muxer: Box<dyn TimelineMuxer>,
        executor: Box<dyn SegmentExecutor>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            prober,
            audio_reader,
            recognizer,
            translator,
            synthesizer,
            stretcher,
            muxer,
            executor,
            logger,
        }
    }

    pub fn execute(
        &mut self,
        input: &Path,
        output: &Path,
        options: DubOptions,
    ) -> Result<DubReport, DubError> {
        let metadata = self
            .prober
            .probe(input)
            .map_err(|source| DubError::Probe { source })?;
        self.logger.info(&format!(
            "Input: {}x{} @ {:.2} fps, {:.2}s",
            metadata.width, metadata.height, metadata.fps, metadata.duration
        ));
        let epsilon = metadata.sync_epsilon();

        let audio = self
            .audio_reader
            .read_audio(input, WHISPER_SAMPLE_RATE)
            .map_err(|source| DubError::Transcription { source })?
            .ok_or_else(|| DubError::Transcription {
                source: "input has no audio stream".into(),
            })?;
        if audio.is_empty() {
            return Err(DubError::Transcription {
                source: "input audio stream is empty".into(),
            });
        }

        let started = Instant::now();
        let transcript = self
            .recognizer
            .transcribe(&audio)
            .map_err(|source| DubError::Transcription { source })?;
        self.logger
            .timing("transcribe", started.elapsed().as_secs_f64() * 1000.0);

        let segments = Segment::normalize(&transcript, metadata.duration);
        if segments.is_empty() {
            return Err(DubError::Transcription {
                source: "no usable speech segments found".into(),
            });
        }
        self.logger.metric("segments", segments.len() as f64);
        for segment in &segments {
            self.logger.info(&format!(
                "Seg {}: {:.2}-{:.2}s: {}",
                segment.index, segment.start, segment.end, segment.source_text
            ));
        }

        let jobs: Vec<SegmentJob> = segments
            .iter()
            .map(|s| SegmentJob::new(s.clone(), VideoSlice::new(s.start, s.end)))
            .collect();
        let segment_count = jobs.len();

        let config = ExecutorConfig {
            workers: options.workers,
            source_lang: options.source_lang,
            target_lang: options.target_lang,
            speaking_rate: options.speaking_rate,
            epsilon,
            on_progress: options.on_progress,
            cancelled: options.cancelled,
        };

        let started = Instant::now();
        let units = self.executor.execute(
            jobs,
            &*self.translator,
            &*self.synthesizer,
            &*self.stretcher,
            config,
        )?;
        self.logger
            .timing("segments", started.elapsed().as_secs_f64() * 1000.0);

        let timeline = TimelineAssembler::new(epsilon).assemble(units)?;
        self.logger.info(&format!(
            "Timeline assembled: {} units, {:.2}s",
            timeline.len(),
            timeline.total_duration()
        ));

        let started = Instant::now();
        self.muxer
            .mux(input, &timeline, output)
            .map_err(|source| DubError::Mux { source })?;
        self.logger
            .timing("mux", started.elapsed().as_secs_f64() * 1000.0);
        self.logger.summary();

        Ok(DubReport {
            segments: segment_count,
            source_duration: metadata.duration,
            output_duration: timeline.total_duration(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::domain::audio_clip::AudioClip;
    use crate::audio::domain::transcript::TranscriptSegment;
    use crate::dubbing::domain::timeline::OutputTimeline;
    use crate::pipeline::infrastructure::threaded_segment_executor::ThreadedSegmentExecutor;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::error::SendError;
    use crate::shared::video_metadata::VideoMetadata;
    use approx::assert_relative_eq;
    use std::path::PathBuf;
    use std::sync::Mutex;

    const SAMPLE_RATE: u32 = 24000;

    struct StubProber {
        duration: f64,
    }

    impl VideoProber for StubProber {
        fn probe(&self, path: &Path) -> Result<VideoMetadata, SendError> {
            Ok(VideoMetadata {
                width: 640,
                height: 360,
                fps: 30.0,
                total_frames: (self.duration * 30.0) as usize,
                duration: self.duration,
                codec: "h264".to_string(),
                source_path: Some(path.to_path_buf()),
            })
        }
    }

    struct FailingProber;

    impl VideoProber for FailingProber {
        fn probe(&self, _path: &Path) -> Result<VideoMetadata, SendError> {
            Err("moov atom not found".into())
        }
    }

    struct StubAudioReader {
        clip: Option<AudioClip>,
    }

    impl AudioReader for StubAudioReader {
        fn read_audio(
            &self,
            _path: &Path,
            _target_sample_rate: u32,
        ) -> Result<Option<AudioClip>, SendError> {
            Ok(self.clip.clone())
        }
    }

    struct StubRecognizer {
        transcript: Vec<TranscriptSegment>,
    }

    impl SpeechRecognizer for StubRecognizer {
        fn transcribe(&self, _audio: &AudioClip) -> Result<Vec<TranscriptSegment>, SendError> {
            Ok(self.transcript.clone())
        }
    }

    struct EchoTranslator;

    impl Translator for EchoTranslator {
        fn translate(
            &self,
            text: &str,
            _source_lang: &str,
            _target_lang: &str,
        ) -> Result<String, SendError> {
            Ok(text.to_string())
        }
    }

    /// Synthesizes a clip whose duration equals the number at the end of
    /// the text.
    struct NumberSynthesizer;

    impl SpeechSynthesizer for NumberSynthesizer {
        fn synthesize(&self, text: &str, _lang: &str) -> Result<AudioClip, SendError> {
            let seconds: f64 = text
                .rsplit(' ')
                .next()
                .and_then(|w| w.parse().ok())
                .unwrap_or(1.0);
            let samples = vec![0.0f32; (seconds * SAMPLE_RATE as f64).round() as usize];
            Ok(AudioClip::new(samples, SAMPLE_RATE))
        }
    }

    struct ExactStretcher;

    impl TimeStretcher for ExactStretcher {
        fn stretch(&self, clip: &AudioClip, rate: f64) -> Result<AudioClip, DubError> {
            let out_len = (clip.samples().len() as f64 / rate).round() as usize;
            Ok(AudioClip::new(vec![0.0; out_len], clip.sample_rate()))
        }
    }

    /// Always misses the target duration badly, to force a desync.
    struct DriftingStretcher;

    impl TimeStretcher for DriftingStretcher {
        fn stretch(&self, clip: &AudioClip, _rate: f64) -> Result<AudioClip, DubError> {
            let out_len = clip.samples().len() + SAMPLE_RATE as usize;
            Ok(AudioClip::new(vec![0.0; out_len], clip.sample_rate()))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingMuxer {
        calls: Arc<Mutex<Vec<(PathBuf, usize, f64)>>>,
    }

    impl TimelineMuxer for RecordingMuxer {
        fn mux(
            &self,
            source: &Path,
            timeline: &OutputTimeline,
            _output: &Path,
        ) -> Result<(), SendError> {
            self.calls.lock().unwrap().push((
                source.to_path_buf(),
                timeline.len(),
                timeline.total_duration(),
            ));
            Ok(())
        }
    }

    fn raw(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start_time: start,
            end_time: end,
            text: text.to_string(),
        }
    }

    fn audio_clip(seconds: f64) -> AudioClip {
        AudioClip::new(vec![0.1; (seconds * 16000.0) as usize], 16000)
    }

    fn use_case(
        prober: Box<dyn VideoProber>,
        reader: Box<dyn AudioReader>,
        recognizer: Box<dyn SpeechRecognizer>,
        stretcher: Box<dyn TimeStretcher>,
        muxer: Box<dyn TimelineMuxer>,
    ) -> DubVideoUseCase {
        DubVideoUseCase::new(
            prober,
            reader,
            recognizer,
            Box::new(EchoTranslator),
            Box::new(NumberSynthesizer),
            stretcher,
            muxer,
            Box::new(ThreadedSegmentExecutor::new()),
            Box::new(NullPipelineLogger),
        )
    }

    fn options() -> DubOptions {
        DubOptions {
            speaking_rate: 1.0,
            workers: 1,
            ..DubOptions::default()
        }
    }

    #[test]
    fn test_execute_produces_report_and_muxes_once() {
        let muxer = RecordingMuxer::default();
        let calls = muxer.calls.clone();
        let mut uc = use_case(
            Box::new(StubProber { duration: 10.0 }),
            Box::new(StubAudioReader {
                clip: Some(audio_clip(10.0)),
            }),
            Box::new(StubRecognizer {
                transcript: vec![raw(0.0, 1.0, "one 1.0"), raw(1.0, 3.0, "two 2.0")],
            }),
            Box::new(ExactStretcher),
            Box::new(muxer),
        );

        let report = uc
            .execute(Path::new("in.mp4"), Path::new("out.mp4"), options())
            .unwrap();

        assert_eq!(report.segments, 2);
        assert_relative_eq!(report.source_duration, 10.0);
        assert_relative_eq!(report.output_duration, 3.0, epsilon = 2.0 / 30.0);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, 2);
    }

    #[test]
    fn test_probe_failure_aborts_before_transcription() {
        let muxer = RecordingMuxer::default();
        let calls = muxer.calls.clone();
        let mut uc = use_case(
            Box::new(FailingProber),
            Box::new(StubAudioReader {
                clip: Some(audio_clip(10.0)),
            }),
            Box::new(StubRecognizer { transcript: vec![] }),
            Box::new(ExactStretcher),
            Box::new(muxer),
        );

        let result = uc.execute(Path::new("in.mp4"), Path::new("out.mp4"), options());
        assert!(matches!(result, Err(DubError::Probe { .. })));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_audio_stream_is_a_transcription_error() {
        let mut uc = use_case(
            Box::new(StubProber { duration: 10.0 }),
            Box::new(StubAudioReader { clip: None }),
            Box::new(StubRecognizer { transcript: vec![] }),
            Box::new(ExactStretcher),
            Box::new(RecordingMuxer::default()),
        );

        let result = uc.execute(Path::new("in.mp4"), Path::new("out.mp4"), options());
        assert!(matches!(result, Err(DubError::Transcription { .. })));
    }

    #[test]
    fn test_empty_transcript_is_a_transcription_error() {
        let mut uc = use_case(
            Box::new(StubProber { duration: 10.0 }),
            Box::new(StubAudioReader {
                clip: Some(audio_clip(10.0)),
            }),
            Box::new(StubRecognizer { transcript: vec![] }),
            Box::new(ExactStretcher),
            Box::new(RecordingMuxer::default()),
        );

        let result = uc.execute(Path::new("in.mp4"), Path::new("out.mp4"), options());
        assert!(matches!(result, Err(DubError::Transcription { .. })));
    }

    #[test]
    fn test_desync_halts_without_muxing() {
        let muxer = RecordingMuxer::default();
        let calls = muxer.calls.clone();
        let mut uc = use_case(
            Box::new(StubProber { duration: 10.0 }),
            Box::new(StubAudioReader {
                clip: Some(audio_clip(10.0)),
            }),
            Box::new(StubRecognizer {
                // Utterance shorter than segment forces the stretch branch,
                // where the drifting stretcher misses the target
                transcript: vec![raw(0.0, 3.0, "one 1.0")],
            }),
            Box::new(DriftingStretcher),
            Box::new(muxer),
        );

        let result = uc.execute(Path::new("in.mp4"), Path::new("out.mp4"), options());
        assert!(matches!(result, Err(DubError::Desync { index: 0, .. })));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_progress_cancellation_halts_without_muxing() {
        let muxer = RecordingMuxer::default();
        let calls = muxer.calls.clone();
        let mut uc = use_case(
            Box::new(StubProber { duration: 10.0 }),
            Box::new(StubAudioReader {
                clip: Some(audio_clip(10.0)),
            }),
            Box::new(StubRecognizer {
                transcript: vec![raw(0.0, 1.0, "one 1.0"), raw(1.0, 2.0, "two 1.0")],
            }),
            Box::new(ExactStretcher),
            Box::new(muxer),
        );

        let mut opts = options();
        opts.on_progress = Some(Box::new(|_current, _total| false));
        let result = uc.execute(Path::new("in.mp4"), Path::new("out.mp4"), opts);
        assert!(matches!(result, Err(DubError::Cancelled)));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_longer_utterances_lengthen_the_output() {
        // 2.0s segment dubbed with 3.0s of speech: the output timeline
        // grows to the utterance's length
        let muxer = RecordingMuxer::default();
        let mut uc = use_case(
            Box::new(StubProber { duration: 10.0 }),
            Box::new(StubAudioReader {
                clip: Some(audio_clip(10.0)),
            }),
            Box::new(StubRecognizer {
                transcript: vec![raw(0.0, 2.0, "long 3.0")],
            }),
            Box::new(ExactStretcher),
            Box::new(muxer),
        );

        let report = uc
            .execute(Path::new("in.mp4"), Path::new("out.mp4"), options())
            .unwrap();
        assert_relative_eq!(report.output_duration, 3.0, epsilon = 1.0 / 30.0);
    }

    #[test]
    fn test_segments_past_video_end_are_dropped() {
        let mut uc = use_case(
            Box::new(StubProber { duration: 2.0 }),
            Box::new(StubAudioReader {
                clip: Some(audio_clip(2.0)),
            }),
            Box::new(StubRecognizer {
                transcript: vec![raw(0.0, 1.0, "kept 1.0"), raw(5.0, 6.0, "dropped 1.0")],
            }),
            Box::new(ExactStretcher),
            Box::new(RecordingMuxer::default()),
        );

        let report = uc
            .execute(Path::new("in.mp4"), Path::new("out.mp4"), options())
            .unwrap();
        assert_eq!(report.segments, 1);
    }
}
