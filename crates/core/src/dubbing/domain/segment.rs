use crate::audio::domain::transcript::TranscriptSegment;

/// A contiguous time span of the source video with its transcribed text.
///
/// Indices are dense and 0-based after normalization; spans are ordered
/// by start and non-overlapping. Segments are read-only once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub source_text: String,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Build the segment list from raw recognizer output.
    ///
    /// Spans starting at or past the end of the video are discarded, ends
    /// are clamped to the video duration and to the next span's start so
    /// the final timeline has no overlaps, and anything left with a
    /// non-positive span or empty text is dropped. Surviving segments are
    /// re-indexed densely.
    pub fn normalize(transcript: &[TranscriptSegment], total_duration: f64) -> Vec<Segment> {
        let mut segments = Vec::with_capacity(transcript.len());

        for (i, raw) in transcript.iter().enumerate() {
            if raw.start_time >= total_duration || raw.start_time < 0.0 {
                continue;
            }

            let next_start = transcript
                .get(i + 1)
                .map(|n| n.start_time)
                .unwrap_or(f64::INFINITY);
            let end = raw.end_time.min(total_duration).min(next_start.max(raw.start_time));

            let text = raw.text.trim();
            if end <= raw.start_time || text.is_empty() {
                continue;
            }

            segments.push(Segment {
                index: segments.len(),
                start: raw.start_time,
                end,
                source_text: text.to_string(),
            });
        }

        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn raw(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start_time: start,
            end_time: end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_normalize_passes_clean_segments_through() {
        let transcript = vec![raw(0.0, 1.0, "one"), raw(1.0, 3.0, "two")];
        let segments = Segment::normalize(&transcript, 10.0);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].index, 0);
        assert_eq!(segments[1].index, 1);
        assert_eq!(segments[1].source_text, "two");
        assert_relative_eq!(segments[1].duration(), 2.0);
    }

    #[test]
    fn test_normalize_clamps_end_to_video_duration() {
        let transcript = vec![raw(8.0, 12.0, "tail")];
        let segments = Segment::normalize(&transcript, 10.0);
        assert_eq!(segments.len(), 1);
        assert_relative_eq!(segments[0].end, 10.0);
    }

    #[test]
    fn test_normalize_drops_segments_past_video_end() {
        let transcript = vec![raw(0.0, 1.0, "keep"), raw(10.0, 11.0, "drop")];
        let segments = Segment::normalize(&transcript, 10.0);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].source_text, "keep");
    }

    #[test]
    fn test_normalize_collapses_overlap_onto_next_start() {
        let transcript = vec![raw(0.0, 2.5, "a"), raw(2.0, 4.0, "b")];
        let segments = Segment::normalize(&transcript, 10.0);
        assert_relative_eq!(segments[0].end, 2.0);
        assert_relative_eq!(segments[1].start, 2.0);
    }

    #[test]
    fn test_normalize_drops_empty_text_and_reindexes() {
        let transcript = vec![raw(0.0, 1.0, "a"), raw(1.0, 2.0, "   "), raw(2.0, 3.0, "c")];
        let segments = Segment::normalize(&transcript, 10.0);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].index, 0);
        assert_eq!(segments[1].index, 1);
        assert_eq!(segments[1].source_text, "c");
    }

    #[test]
    fn test_normalize_drops_zero_span() {
        let transcript = vec![raw(1.0, 1.0, "nothing")];
        assert!(Segment::normalize(&transcript, 10.0).is_empty());
    }

    #[test]
    fn test_normalize_drops_negative_start() {
        let transcript = vec![raw(-0.5, 1.0, "weird")];
        assert!(Segment::normalize(&transcript, 10.0).is_empty());
    }

    #[test]
    fn test_normalize_empty_transcript() {
        assert!(Segment::normalize(&[], 10.0).is_empty());
    }

    #[test]
    fn test_normalized_segments_never_overlap() {
        let transcript = vec![
            raw(0.0, 3.0, "a"),
            raw(1.5, 4.0, "b"),
            raw(3.5, 9.0, "c"),
        ];
        let segments = Segment::normalize(&transcript, 8.0);
        for pair in segments.windows(2) {
            assert!(pair[0].end <= pair[1].start, "{pair:?} overlaps");
        }
        assert!(segments.iter().all(|s| s.end <= 8.0));
    }
}
