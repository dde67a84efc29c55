use crate::shared::error::SendError;

/// Domain interface for text translation between two languages.
///
/// A failure must surface as an error; implementations never silently
/// return the source text untranslated.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, source_lang: &str, target_lang: &str)
        -> Result<String, SendError>;
}
