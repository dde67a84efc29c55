pub mod dub_video_use_case;
pub mod infrastructure;
pub mod pipeline_logger;
pub mod segment_executor;
