use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::data::models::{DraftCardResponse, ExampleSentence, PageRange};

/// Generate drafts from the next unprocessed pages of a book
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateNextBatchRequest {
    pub book_id: i32,
    #[serde(default = "default_num_pages")]
    #[validate(range(min = 1, max = 50, message = "num_pages must be between 1 and 50"))]
    pub num_pages: i32,
    #[serde(default = "default_num_cards")]
    #[validate(range(min = 1, max = 50, message = "num_cards must be between 1 and 50"))]
    pub num_cards: i32,
}

/// Generate drafts from an explicit, inclusive page range
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateFromRangeRequest {
    pub book_id: i32,
    #[validate(range(min = 1, message = "start_page starts at 1"))]
    pub start_page: i32,
    #[validate(range(min = 1, message = "end_page starts at 1"))]
    pub end_page: i32,
    #[serde(default = "default_num_cards")]
    #[validate(range(min = 1, max = 50, message = "num_cards must be between 1 and 50"))]
    pub num_cards: i32,
}

fn default_num_pages() -> i32 {
    5
}

fn default_num_cards() -> i32 {
    10
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub batch_id: String,
    pub drafts: Vec<DraftCardResponse>,
    pub pages_processed: PageRange,
    pub message: String,
}

/// One flashcard as proposed by the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCard {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub examples: Vec<ExampleSentence>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
    pub part_of_speech: Option<String>,
    pub gender: Option<String>,
    pub plural_form: Option<String>,
    pub pronunciation: Option<String>,
    pub notes: Option<String>,
}
