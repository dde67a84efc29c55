use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::audio::domain::speech_synthesizer::SpeechSynthesizer;
use crate::audio::domain::time_stretcher::TimeStretcher;
use crate::audio::domain::translator::Translator;
use crate::dubbing::domain::segment_resynchronizer::SegmentResynchronizer;
use crate::dubbing::domain::timeline::TimelineUnit;
use crate::dubbing::domain::utterance::SynthesizedUtterance;
use crate::pipeline::segment_executor::{ExecutorConfig, SegmentExecutor, SegmentJob};
use crate::shared::error::DubError;

const DEFAULT_WORKERS: usize = 4;

/// Executes segment jobs on a worker pool.
///
/// Segments are independent (translate → synthesize → fit touches no
/// shared state), so they fan out over `workers` threads and results are
/// reassembled by index afterwards. The first failure flips the shared
/// cancellation flag; workers drain what is in flight and stop, and no
/// partial output escapes.
pub struct ThreadedSegmentExecutor {
    workers: usize,
}

impl ThreadedSegmentExecutor {
    pub fn new() -> Self {
        Self { workers: 0 }
    }

    pub fn with_workers(workers: usize) -> Self {
        Self { workers }
    }

    fn effective_workers(&self, config_workers: usize, jobs: usize) -> usize {
        let requested = if config_workers > 0 {
            config_workers
        } else if self.workers > 0 {
            self.workers
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(DEFAULT_WORKERS)
                .min(DEFAULT_WORKERS)
        };
        requested.min(jobs).max(1)
    }
}

impl Default for ThreadedSegmentExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentExecutor for ThreadedSegmentExecutor {
    fn execute(
        &self,
        jobs: Vec<SegmentJob>,
        translator: &dyn Translator,
        synthesizer: &dyn SpeechSynthesizer,
        stretcher: &dyn TimeStretcher,
        config: ExecutorConfig,
    ) -> Result<Vec<TimelineUnit>, DubError> {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let total = jobs.len();
        let workers = self.effective_workers(config.workers, total);
        let cancelled = config.cancelled;
        let on_progress = config.on_progress;
        let source_lang = config.source_lang.as_str();
        let target_lang = config.target_lang.as_str();
        let speaking_rate = config.speaking_rate;
        let epsilon = config.epsilon;

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<SegmentJob>();
        let (result_tx, result_rx) =
            crossbeam_channel::unbounded::<(usize, Result<TimelineUnit, DubError>)>();

        for job in jobs {
            // Unbounded channel; send cannot fail while job_rx is alive
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let mut slots: Vec<Option<TimelineUnit>> = (0..total).map(|_| None).collect();
        let mut first_error: Option<DubError> = None;
        let mut worker_panicked = false;

        std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let cancelled = Arc::clone(&cancelled);
                handles.push(scope.spawn(move || {
                    for job in job_rx {
                        if cancelled.load(Ordering::Relaxed) {
                            break;
                        }
                        let index = job.segment.index;
                        let result = process_segment(
                            &job,
                            translator,
                            synthesizer,
                            stretcher,
                            source_lang,
                            target_lang,
                            speaking_rate,
                            epsilon,
                        );
                        if result_tx.send((index, result)).is_err() {
                            break;
                        }
                    }
                }));
            }
            drop(result_tx);

            let mut completed = 0usize;
            for (index, result) in result_rx {
                match result {
                    Ok(unit) => {
                        completed += 1;
                        if let Some(slot) = slots.get_mut(index) {
                            *slot = Some(unit);
                        }
                        if let Some(ref callback) = on_progress {
                            if !callback(completed, total) && first_error.is_none() {
                                cancelled.store(true, Ordering::Relaxed);
                                first_error = Some(DubError::Cancelled);
                            }
                        }
                    }
                    Err(e) => {
                        cancelled.store(true, Ordering::Relaxed);
                        if first_error.is_none() {
                            first_error = Some(e);
                        }
                    }
                }
            }

            for handle in handles {
                if handle.join().is_err() {
                    worker_panicked = true;
                }
            }
        });

        if let Some(e) = first_error {
            return Err(e);
        }
        if worker_panicked {
            return Err(DubError::WorkerPanic);
        }

        slots
            .into_iter()
            .map(|slot| slot.ok_or(DubError::WorkerPanic))
            .collect()
    }
}

#[allow(clippy::too_many_arguments)]
fn process_segment(
    job: &SegmentJob,
    translator: &dyn Translator,
    synthesizer: &dyn SpeechSynthesizer,
    stretcher: &dyn TimeStretcher,
    source_lang: &str,
    target_lang: &str,
    speaking_rate: f64,
    epsilon: f64,
) -> Result<TimelineUnit, DubError> {
    let index = job.segment.index;

    let translated = translator
        .translate(&job.segment.source_text, source_lang, target_lang)
        .map_err(|source| DubError::Translation { index, source })?;

    let mut audio = synthesizer
        .synthesize(&translated, target_lang)
        .map_err(|source| DubError::Synthesis { index, source })?;

    // Pre-stretch compresses overly slow synthesis before fitting, so the
    // fitter sees utterances closer to their segment spans
    if (speaking_rate - 1.0).abs() > f64::EPSILON {
        audio = stretcher.stretch(&audio, speaking_rate)?;
    }

    let utterance = SynthesizedUtterance::new(index, audio);
    SegmentResynchronizer::new(stretcher, epsilon).resynchronize(
        &job.segment,
        job.video,
        &utterance,
    )
}
