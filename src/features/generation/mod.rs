//! Draft flashcard generation from book pages.

pub mod gemini;
pub mod pdf;

use async_trait::async_trait;
use thiserror::Error;

use crate::data::models::GeneratedCard;

pub use gemini::GeminiGenerator;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Flashcard generation is not configured (GEMINI_API_KEY is missing)")]
    NotConfigured,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Generator returned an error: {0}")]
    Remote(String),
    #[error("Generator response could not be read: {0}")]
    MalformedResponse(String),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// What to ask the generator for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub num_cards: i32,
    pub target_language: String,
    pub native_language: String,
}

impl GenerationRequest {
    pub fn new(
        num_cards: i32,
        target_language: Option<&str>,
        native_language: Option<&str>,
    ) -> Self {
        Self {
            num_cards,
            target_language: target_language
                .filter(|s| !s.trim().is_empty())
                .unwrap_or("the target language")
                .to_string(),
            native_language: native_language
                .filter(|s| !s.trim().is_empty())
                .unwrap_or("English")
                .to_string(),
        }
    }
}

#[async_trait]
pub trait FlashcardGenerator: Send + Sync {
    /// Proposes flashcards for the pages contained in `pdf`.
    async fn generate(
        &self,
        pdf: Vec<u8>,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedCard>, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_languages_fall_back_to_defaults() {
        let request = GenerationRequest::new(5, Some("  "), None);
        assert_eq!(request.target_language, "the target language");
        assert_eq!(request.native_language, "English");

        let request = GenerationRequest::new(5, Some("German"), Some("Italian"));
        assert_eq!(request.target_language, "German");
        assert_eq!(request.native_language, "Italian");
    }
}
