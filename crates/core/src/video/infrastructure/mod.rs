pub mod ffmpeg_audio_reader;
pub mod ffmpeg_prober;
pub mod ffmpeg_timeline_muxer;
