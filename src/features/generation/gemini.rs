use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{FlashcardGenerator, GenerationError, GenerationRequest};
use crate::data::models::GeneratedCard;

pub const GEMINI_API: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Generator backed by the Gemini `generateContent` REST endpoint.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GenerationResult {
    flashcards: Vec<GeneratedCard>,
}

impl GeminiGenerator {
    pub fn new(client: reqwest::Client, api_key: Option<String>, model: &str) -> Self {
        Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: model.to_string(),
            api_base: GEMINI_API.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }
}

fn build_prompt(request: &GenerationRequest) -> String {
    let target = &request.target_language;
    let native = &request.native_language;
    format!(
        "You are a language learning assistant. Analyze the following PDF pages \
from a {target} language learning textbook.\n\n\
Extract approximately {num} vocabulary words or phrases that would make good \
flashcards for a student learning {target}.\n\n\
For each word/phrase, provide:\n\
- front: the word/phrase in {target}\n\
- back: translation to {native}\n\
- examples: exactly 3 example sentences using the word in {target}, each with its {native} translation\n\
- synonyms: up to 3 synonyms in {target} (empty list if none applicable)\n\
- antonyms: up to 3 antonyms in {target} (empty list if none applicable)\n\
- part_of_speech: the grammatical category (noun, verb, adjective, adverb, etc.)\n\
- gender: grammatical gender if applicable to {target} (null if not applicable)\n\
- plural_form: the plural form if applicable (null if not applicable)\n\
- pronunciation: IPA pronunciation or phonetic guide\n\
- notes: any important usage notes, irregular forms, or cultural context\n\n\
Focus on the most useful and pedagogically valuable vocabulary from these pages.",
        num = request.num_cards,
    )
}

fn response_schema() -> Value {
    let string_list = json!({ "type": "ARRAY", "items": { "type": "STRING" } });
    json!({
        "type": "OBJECT",
        "properties": {
            "flashcards": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "front": { "type": "STRING" },
                        "back": { "type": "STRING" },
                        "examples": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "sentence": { "type": "STRING" },
                                    "translation": { "type": "STRING" }
                                },
                                "required": ["sentence", "translation"]
                            }
                        },
                        "synonyms": string_list,
                        "antonyms": string_list,
                        "part_of_speech": { "type": "STRING" },
                        "gender": { "type": "STRING", "nullable": true },
                        "plural_form": { "type": "STRING", "nullable": true },
                        "pronunciation": { "type": "STRING", "nullable": true },
                        "notes": { "type": "STRING", "nullable": true }
                    },
                    "required": ["front", "back", "examples", "synonyms", "antonyms", "part_of_speech"]
                }
            }
        },
        "required": ["flashcards"]
    })
}

/// Pulls the flashcard list out of a `generateContent` reply.
fn parse_response(body: GenerateContentResponse) -> Result<Vec<GeneratedCard>, GenerationError> {
    let text: String = body
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .ok_or_else(|| GenerationError::MalformedResponse("no candidates returned".into()))?;

    let result: GenerationResult = serde_json::from_str(&text)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    Ok(result.flashcards)
}

#[async_trait]
impl FlashcardGenerator for GeminiGenerator {
    async fn generate(
        &self,
        pdf: Vec<u8>,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedCard>, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::NotConfigured)?;

        let body = json!({
            "contents": [{
                "parts": [
                    { "inline_data": { "mime_type": "application/pdf", "data": STANDARD.encode(&pdf) } },
                    { "text": build_prompt(request) }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
                "temperature": 0.3
            }
        });

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.api_base, self.model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationError::Remote(format!("{}: {}", status, detail)));
        }

        let cards = parse_response(response.json().await?)?;
        log::info!("Gemini generated {} flashcards", cards.len());
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let generator = GeminiGenerator::new(reqwest::Client::new(), Some("  ".into()), "gemini-2.5-flash");
        let request = GenerationRequest::new(3, None, None);
        assert!(matches!(
            generator.generate(Vec::new(), &request).await,
            Err(GenerationError::NotConfigured)
        ));
    }

    #[test]
    fn prompt_names_languages_and_count() {
        let prompt = build_prompt(&GenerationRequest::new(12, Some("Spanish"), Some("Dutch")));
        assert!(prompt.contains("approximately 12 vocabulary words"));
        assert!(prompt.contains("translation to Dutch"));
        assert!(prompt.contains("learning Spanish"));
    }

    #[test]
    fn parses_structured_reply() {
        let reply: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": r#"{"flashcards":[{"front":"el perro","back":"the dog","examples":[{"sentence":"El perro ladra.","translation":"The dog barks."}],"synonyms":[],"antonyms":[],"part_of_speech":"noun","gender":"masculine"}]}"# }] }
            }]
        }))
        .unwrap();

        let cards = parse_response(reply).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].front, "el perro");
        assert_eq!(cards[0].gender.as_deref(), Some("masculine"));
        assert_eq!(cards[0].examples[0].translation, "The dog barks.");
    }

    #[test]
    fn empty_reply_is_malformed() {
        let reply: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            parse_response(reply),
            Err(GenerationError::MalformedResponse(_))
        ));
    }
}
