pub mod duration_fitter;
pub mod segment;
pub mod segment_resynchronizer;
pub mod timeline;
pub mod utterance;
