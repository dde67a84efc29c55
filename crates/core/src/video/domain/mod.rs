pub mod audio_reader;
pub mod timeline_muxer;
pub mod video_prober;
pub mod video_slice;
