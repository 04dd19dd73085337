use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::result::Error as DieselError;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::data::models::{ExampleSentence, decode_column};
use crate::schema::draft_cards;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl DraftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::Pending => "pending",
            DraftStatus::Approved => "approved",
            DraftStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DraftStatus::Pending),
            "approved" => Ok(DraftStatus::Approved),
            "rejected" => Ok(DraftStatus::Rejected),
            other => Err(format!("Unknown draft status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = draft_cards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DraftRow {
    pub draft_id: i32,
    pub owner_id: i32,
    pub book_id: i32,
    pub front: String,
    pub back: String,
    pub examples: String,
    pub synonyms: String,
    pub antonyms: String,
    pub part_of_speech: Option<String>,
    pub gender: Option<String>,
    pub plural_form: Option<String>,
    pub pronunciation: Option<String>,
    pub notes: Option<String>,
    pub tags: String,
    pub status: String,
    pub source_page_start: Option<i32>,
    pub source_page_end: Option<i32>,
    pub generation_batch_id: Option<String>,
    pub date_created: NaiveDateTime,
}

impl DraftRow {
    pub fn draft_status(&self) -> Result<DraftStatus, DieselError> {
        self.status
            .parse()
            .map_err(|e: String| DieselError::DeserializationError(e.into()))
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = draft_cards)]
pub struct NewDraft {
    pub owner_id: i32,
    pub book_id: i32,
    pub front: String,
    pub back: String,
    pub examples: String,
    pub synonyms: String,
    pub antonyms: String,
    pub part_of_speech: Option<String>,
    pub gender: Option<String>,
    pub plural_form: Option<String>,
    pub pronunciation: Option<String>,
    pub notes: Option<String>,
    pub tags: String,
    pub status: String,
    pub source_page_start: Option<i32>,
    pub source_page_end: Option<i32>,
    pub generation_batch_id: Option<String>,
    pub date_created: NaiveDateTime,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = draft_cards)]
pub struct DraftChangeset {
    pub front: Option<String>,
    pub back: Option<String>,
    pub examples: Option<String>,
    pub synonyms: Option<String>,
    pub antonyms: Option<String>,
    pub part_of_speech: Option<String>,
    pub gender: Option<String>,
    pub plural_form: Option<String>,
    pub pronunciation: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct DraftCardUpdate {
    #[validate(length(min = 1, message = "Front must not be empty"))]
    pub front: Option<String>,
    #[validate(length(min = 1, message = "Back must not be empty"))]
    pub back: Option<String>,
    pub examples: Option<Vec<ExampleSentence>>,
    pub synonyms: Option<Vec<String>>,
    pub antonyms: Option<Vec<String>>,
    pub part_of_speech: Option<String>,
    pub gender: Option<String>,
    pub plural_form: Option<String>,
    pub pronunciation: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftCardResponse {
    pub id: i32,
    pub front: String,
    pub back: String,
    pub examples: Vec<ExampleSentence>,
    pub synonyms: Vec<String>,
    pub antonyms: Vec<String>,
    pub part_of_speech: Option<String>,
    pub gender: Option<String>,
    pub plural_form: Option<String>,
    pub pronunciation: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub status: DraftStatus,
    pub book_id: i32,
    pub source_page_start: Option<i32>,
    pub source_page_end: Option<i32>,
    pub generation_batch_id: Option<String>,
    pub date_created: NaiveDateTime,
}

impl TryFrom<DraftRow> for DraftCardResponse {
    type Error = DieselError;

    fn try_from(row: DraftRow) -> Result<Self, Self::Error> {
        Ok(DraftCardResponse {
            status: row.draft_status()?,
            examples: decode_column(&row.examples)?,
            synonyms: decode_column(&row.synonyms)?,
            antonyms: decode_column(&row.antonyms)?,
            tags: decode_column(&row.tags)?,
            id: row.draft_id,
            front: row.front,
            back: row.back,
            part_of_speech: row.part_of_speech,
            gender: row.gender,
            plural_form: row.plural_form,
            pronunciation: row.pronunciation,
            notes: row.notes,
            book_id: row.book_id,
            source_page_start: row.source_page_start,
            source_page_end: row.source_page_end,
            generation_batch_id: row.generation_batch_id,
            date_created: row.date_created,
        })
    }
}

/// Query string of the draft listing.
#[derive(Debug, Deserialize, Validate)]
pub struct DraftFilter {
    pub book_id: Option<i32>,
    pub batch_id: Option<String>,
    #[serde(default)]
    pub status: DraftStatus,
    #[serde(default)]
    #[validate(range(min = 0, message = "skip must not be negative"))]
    pub skip: i64,
    #[serde(default = "default_draft_limit")]
    #[validate(range(min = 1, max = 200, message = "limit must be between 1 and 200"))]
    pub limit: i64,
}

fn default_draft_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct ApproveParams {
    pub deck_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RejectedCleanupParams {
    pub book_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkApproveRequest {
    #[validate(length(min = 1, message = "draft_ids must not be empty"))]
    pub draft_ids: Vec<i32>,
    pub deck_id: Option<i32>,
}
