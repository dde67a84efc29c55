use std::path::Path;

use crate::audio::domain::audio_clip::AudioClip;
use crate::dubbing::domain::timeline::OutputTimeline;
use crate::shared::error::SendError;
use crate::video::domain::timeline_muxer::TimelineMuxer;

/// Fixed output video time base; fine enough to place speed-scaled
/// frames without rounding collisions at any common frame rate.
const VIDEO_TIME_BASE: i32 = 90000;

/// Default H.264 CRF when the caller doesn't specify one.
const DEFAULT_CRF: u32 = 18;

/// Renders an assembled timeline into a muxed video file via ffmpeg-next.
///
/// One sequential decode pass over the source: frames whose timestamps
/// fall inside a timeline unit are re-stamped to
/// `unit.output_start + (t - unit.start) / unit.speed` and re-encoded;
/// frames between units are dropped. The concatenated audio track is
/// AAC-encoded alongside. Output goes to a temp sibling path and is
/// renamed into place only on success, so a failed run leaves no final
/// artifact behind.
pub struct FfmpegTimelineMuxer {
    crf: u32,
}

impl FfmpegTimelineMuxer {
    pub fn new() -> Self {
        Self { crf: DEFAULT_CRF }
    }

    pub fn with_crf(mut self, crf: u32) -> Self {
        self.crf = crf;
        self
    }
}

impl Default for FfmpegTimelineMuxer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineMuxer for FfmpegTimelineMuxer {
    fn mux(
        &self,
        source: &Path,
        timeline: &OutputTimeline,
        output: &Path,
    ) -> Result<(), SendError> {
        if timeline.is_empty() {
            return Err("cannot mux an empty timeline".into());
        }
        ffmpeg_next::init()?;

        let ext = output.extension().and_then(|e| e.to_str()).unwrap_or("mp4");
        let temp_path = output.with_extension(format!("_mux.{ext}"));

        match self.render(source, timeline, &temp_path) {
            Ok(()) => {
                std::fs::rename(&temp_path, output)?;
                Ok(())
            }
            Err(e) => {
                let _ = std::fs::remove_file(&temp_path);
                Err(e)
            }
        }
    }
}

/// One timeline unit flattened into source/output coordinates.
struct UnitSpan {
    start: f64,
    end: f64,
    speed: f64,
    output_start: f64,
}

impl FfmpegTimelineMuxer {
    fn render(
        &self,
        source: &Path,
        timeline: &OutputTimeline,
        temp_path: &Path,
    ) -> Result<(), SendError> {
        let spans = flatten(timeline);
        let audio_track = timeline.concat_audio();

        let mut ictx = ffmpeg_next::format::input(source)?;
        let video_stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream in source file")?;
        let video_stream_index = video_stream.index();
        let in_time_base = video_stream.time_base();
        let in_rate = video_stream.rate();

        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(video_stream.parameters())?;
        let mut decoder = codec_ctx.decoder().video()?;

        let mut octx = ffmpeg_next::format::output(temp_path)?;
        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        // Prefer H.264; fall back to MPEG4 on builds without libx264
        let (video_codec, is_h264) = match ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::H264)
        {
            Some(codec) => (codec, true),
            None => (
                ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
                    .ok_or("No H264 or MPEG4 encoder available")?,
                false,
            ),
        };

        let mut ost_video = octx.add_stream(Some(video_codec))?;
        let video_ost_idx = ost_video.index();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(video_codec)
            .encoder()
            .video()?;
        encoder_ctx.set_width(decoder.width());
        encoder_ctx.set_height(decoder.height());
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, VIDEO_TIME_BASE));
        if in_rate.denominator() != 0 {
            encoder_ctx.set_frame_rate(Some(in_rate));
        }
        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let mut opts = ffmpeg_next::Dictionary::new();
        if is_h264 {
            opts.set("crf", &self.crf.to_string());
            opts.set("preset", "medium");
        }
        let mut video_encoder = encoder_ctx.open_with(opts)?;
        ost_video.set_parameters(&video_encoder);

        // AAC audio encoder for the concatenated track
        let aac_codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::AAC)
            .ok_or("AAC encoder not found")?;
        let mut ost_audio = octx.add_stream(Some(aac_codec))?;
        let audio_ost_idx = ost_audio.index();

        let mut audio_encoder = ffmpeg_next::codec::context::Context::new_with_codec(aac_codec)
            .encoder()
            .audio()?;
        audio_encoder.set_rate(audio_track.sample_rate() as i32);
        audio_encoder.set_channel_layout(ffmpeg_next::ChannelLayout::MONO);
        audio_encoder.set_format(ffmpeg_next::format::Sample::F32(
            ffmpeg_next::format::sample::Type::Planar,
        ));
        let mut audio_encoder = audio_encoder.open_as(aac_codec)?;
        ost_audio.set_parameters(&audio_encoder);

        let audio_enc_time_base = audio_encoder.time_base();
        let frame_size = audio_encoder.frame_size() as usize;

        octx.write_header()?;

        let ost_video_tb = octx.stream(video_ost_idx).ok_or("missing video stream")?.time_base();
        let ost_audio_tb = octx.stream(audio_ost_idx).ok_or("missing audio stream")?.time_base();

        // Video: decode, re-stamp, re-encode
        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg_next::format::Pixel::YUV420P,
            decoder.width(),
            decoder.height(),
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let mut state = VideoPassState {
            spans: &spans,
            cursor: 0,
            last_pts: -1,
            in_time_base,
        };

        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        for (stream, packet) in ictx.packets() {
            if stream.index() != video_stream_index {
                continue;
            }
            decoder.send_packet(&packet)?;
            while decoder.receive_frame(&mut decoded).is_ok() {
                encode_mapped_frame(
                    &decoded,
                    &mut state,
                    &mut scaler,
                    &mut video_encoder,
                    &mut octx,
                    video_ost_idx,
                    ost_video_tb,
                )?;
            }
        }
        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded).is_ok() {
            encode_mapped_frame(
                &decoded,
                &mut state,
                &mut scaler,
                &mut video_encoder,
                &mut octx,
                video_ost_idx,
                ost_video_tb,
            )?;
        }

        video_encoder.send_eof()?;
        drain_video_packets(&mut video_encoder, &mut octx, video_ost_idx, ost_video_tb)?;

        // Audio: encode the concatenated track
        encode_audio_track(
            &mut audio_encoder,
            &audio_track,
            &mut octx,
            audio_ost_idx,
            audio_enc_time_base,
            ost_audio_tb,
            frame_size,
        )?;

        octx.write_trailer()?;
        Ok(())
    }
}

struct VideoPassState<'a> {
    spans: &'a [UnitSpan],
    cursor: usize,
    last_pts: i64,
    in_time_base: ffmpeg_next::Rational,
}

/// Cumulative output placement for each timeline unit.
fn flatten(timeline: &OutputTimeline) -> Vec<UnitSpan> {
    let mut spans = Vec::with_capacity(timeline.len());
    let mut output_start = 0.0;
    for unit in timeline.units() {
        spans.push(UnitSpan {
            start: unit.video.start(),
            end: unit.video.end(),
            speed: unit.video.speed(),
            output_start,
        });
        output_start += unit.duration();
    }
    spans
}

/// Re-stamp one decoded frame into output time and encode it, or drop it
/// if it falls outside every remaining unit.
fn encode_mapped_frame(
    decoded: &ffmpeg_next::util::frame::video::Video,
    state: &mut VideoPassState<'_>,
    scaler: &mut ffmpeg_next::software::scaling::Context,
    encoder: &mut ffmpeg_next::codec::encoder::video::Encoder,
    octx: &mut ffmpeg_next::format::context::Output,
    stream_idx: usize,
    ost_time_base: ffmpeg_next::Rational,
) -> Result<(), SendError> {
    let Some(ts) = decoded.timestamp() else {
        return Ok(());
    };
    let t = ts as f64 * state.in_time_base.numerator() as f64
        / state.in_time_base.denominator() as f64;

    while state.cursor < state.spans.len() && t >= state.spans[state.cursor].end {
        state.cursor += 1;
    }
    let Some(span) = state.spans.get(state.cursor) else {
        return Ok(()); // past the last unit
    };
    if t < span.start {
        return Ok(()); // between units
    }

    let t_out = span.output_start + (t - span.start) / span.speed;
    let mut pts = (t_out * VIDEO_TIME_BASE as f64).round() as i64;
    // Encoders require strictly increasing pts; collisions can happen
    // when a unit is sped up past the output tick resolution
    if pts <= state.last_pts {
        pts = state.last_pts + 1;
    }
    state.last_pts = pts;

    let mut yuv = ffmpeg_next::util::frame::video::Video::empty();
    scaler.run(decoded, &mut yuv)?;
    yuv.set_pts(Some(pts));

    encoder.send_frame(&yuv)?;
    drain_video_packets(encoder, octx, stream_idx, ost_time_base)
}

fn drain_video_packets(
    encoder: &mut ffmpeg_next::codec::encoder::video::Encoder,
    octx: &mut ffmpeg_next::format::context::Output,
    stream_idx: usize,
    ost_time_base: ffmpeg_next::Rational,
) -> Result<(), SendError> {
    let mut encoded = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(stream_idx);
        encoded.rescale_ts(ffmpeg_next::Rational(1, VIDEO_TIME_BASE), ost_time_base);
        encoded.write_interleaved(octx)?;
    }
    Ok(())
}

/// Encode a mono f32 track into AAC packets and write them interleaved.
fn encode_audio_track(
    encoder: &mut ffmpeg_next::codec::encoder::audio::Encoder,
    track: &AudioClip,
    octx: &mut ffmpeg_next::format::context::Output,
    stream_idx: usize,
    enc_time_base: ffmpeg_next::Rational,
    ost_time_base: ffmpeg_next::Rational,
    frame_size: usize,
) -> Result<(), SendError> {
    // Some encoders report 0; AAC's usual frame size is 1024
    let chunk_size = if frame_size == 0 { 1024 } else { frame_size };
    let mut pts: i64 = 0;

    for chunk in track.samples().chunks(chunk_size) {
        let mut frame = ffmpeg_next::util::frame::audio::Audio::new(
            ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
            chunk.len(),
            ffmpeg_next::ChannelLayout::MONO,
        );
        frame.set_rate(track.sample_rate());
        frame.set_pts(Some(pts));

        let byte_len = std::mem::size_of_val(chunk);
        let src = unsafe { std::slice::from_raw_parts(chunk.as_ptr() as *const u8, byte_len) };
        frame.data_mut(0)[..byte_len].copy_from_slice(src);

        encoder.send_frame(&frame)?;
        drain_audio_packets(encoder, octx, stream_idx, enc_time_base, ost_time_base)?;
        pts += chunk.len() as i64;
    }

    encoder.send_eof()?;
    drain_audio_packets(encoder, octx, stream_idx, enc_time_base, ost_time_base)
}

fn drain_audio_packets(
    encoder: &mut ffmpeg_next::codec::encoder::audio::Encoder,
    octx: &mut ffmpeg_next::format::context::Output,
    stream_idx: usize,
    enc_time_base: ffmpeg_next::Rational,
    ost_time_base: ffmpeg_next::Rational,
) -> Result<(), SendError> {
    let mut encoded = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(stream_idx);
        encoded.rescale_ts(enc_time_base, ost_time_base);
        encoded.write_interleaved(octx)?;
    }
    Ok(())
}
