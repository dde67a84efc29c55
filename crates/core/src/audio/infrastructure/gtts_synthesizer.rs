use std::io::Write;
use std::time::Duration;

use crate::audio::domain::audio_clip::AudioClip;
use crate::audio::domain::speech_synthesizer::SpeechSynthesizer;
use crate::shared::constants::{TTS_ENDPOINT, TTS_MAX_CHUNK_CHARS, TTS_SAMPLE_RATE};
use crate::shared::error::SendError;
use crate::video::domain::audio_reader::AudioReader;

/// Speech synthesizer backed by the Google Translate TTS endpoint.
///
/// The endpoint caps query length, so long text is split into whitespace
/// chunks and the decoded clips are concatenated. Each MP3 response is
/// written to a scoped temp file and decoded to mono PCM through the
/// [`AudioReader`] port; the temp file is removed when it drops,
/// including on error paths.
pub struct GttsSynthesizer {
    client: reqwest::blocking::Client,
    endpoint: String,
    decoder: Box<dyn AudioReader>,
    sample_rate: u32,
}

impl GttsSynthesizer {
    pub fn new(decoder: Box<dyn AudioReader>) -> Result<Self, SendError> {
        Self::with_endpoint(TTS_ENDPOINT, decoder, TTS_SAMPLE_RATE)
    }

    pub fn with_endpoint(
        endpoint: &str,
        decoder: Box<dyn AudioReader>,
        sample_rate: u32,
    ) -> Result<Self, SendError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            decoder,
            sample_rate,
        })
    }

    fn fetch_chunk(&self, text: &str, lang: &str) -> Result<AudioClip, SendError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", lang),
                ("q", text),
            ])
            .send()?
            .error_for_status()?;
        let bytes = response.bytes()?;
        if bytes.is_empty() {
            return Err("TTS endpoint returned an empty body".into());
        }

        let mut tmp = tempfile::Builder::new().suffix(".mp3").tempfile()?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;

        self.decoder
            .read_audio(tmp.path(), self.sample_rate)?
            .ok_or_else(|| "TTS response contained no decodable audio".into())
    }
}

impl SpeechSynthesizer for GttsSynthesizer {
    fn synthesize(&self, text: &str, lang: &str) -> Result<AudioClip, SendError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err("cannot synthesize empty text".into());
        }

        let mut clip = AudioClip::empty(self.sample_rate);
        for chunk in split_chunks(trimmed, TTS_MAX_CHUNK_CHARS) {
            clip.append(&self.fetch_chunk(&chunk, lang)?);
        }
        Ok(clip)
    }
}

/// Split text into whitespace-delimited chunks of at most `max_chars`
/// characters. A single word longer than the limit becomes its own chunk.
fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
