use std::time::Duration;

use crate::audio::domain::translator::Translator;
use crate::shared::constants::TRANSLATE_ENDPOINT;
use crate::shared::error::SendError;

/// Translator backed by the free Google Translate web endpoint
/// (`translate_a/single?client=gtx`).
///
/// The response is a nested JSON array whose first element holds one
/// `[translated, original, ...]` entry per sentence; the translated
/// pieces are concatenated. Unofficial but stable, and the same endpoint
/// typical client libraries wrap. Failures surface as errors, never as
/// the untranslated source text.
pub struct GoogleTranslator {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new() -> Result<Self, SendError> {
        Self::with_endpoint(TRANSLATE_ENDPOINT)
    }

    /// Point at a different endpoint (used by tests against a local stub).
    pub fn with_endpoint(endpoint: &str) -> Result<Self, SendError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl Translator for GoogleTranslator {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, SendError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()?
            .error_for_status()?;

        let body: serde_json::Value = response.json()?;
        let translated = parse_translation(&body)
            .ok_or_else(|| format!("unexpected translate response shape: {body}"))?;

        if translated.trim().is_empty() {
            return Err("translation returned empty text".into());
        }
        Ok(translated)
    }
}

/// Extracts and joins the per-sentence translations from the gtx response:
/// `[[["sentence one", "orig", ...], ["sentence two", ...]], ...]`.
fn parse_translation(body: &serde_json::Value) -> Option<String> {
    let sentences = body.get(0)?.as_array()?;
    let mut out = String::new();
    for sentence in sentences {
        if let Some(piece) = sentence.get(0).and_then(|p| p.as_str()) {
            out.push_str(piece);
        }
    }
    Some(out)
}
