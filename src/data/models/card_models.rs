use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::result::Error as DieselError;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::data::models::decode_column;
use crate::schema::cards;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardnessLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl HardnessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HardnessLevel::Easy => "easy",
            HardnessLevel::Medium => "medium",
            HardnessLevel::Hard => "hard",
        }
    }
}

impl fmt::Display for HardnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HardnessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(HardnessLevel::Easy),
            "medium" => Ok(HardnessLevel::Medium),
            "hard" => Ok(HardnessLevel::Hard),
            other => Err(format!("Unknown hardness level: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleSentence {
    pub sentence: String,
    pub translation: String,
}

/// Card row as stored; list-valued fields are JSON text.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CardRow {
    pub card_id: i32,
    pub owner_id: i32,
    pub front: String,
    pub back: String,
    pub example_original: Option<String>,
    pub example_translation: Option<String>,
    pub examples: String,
    pub synonyms: String,
    pub antonyms: String,
    pub part_of_speech: Option<String>,
    pub gender: Option<String>,
    pub plural_form: Option<String>,
    pub pronunciation: Option<String>,
    pub notes: Option<String>,
    pub tags: String,
    pub hardness_level: String,
    pub date_created: NaiveDateTime,
    pub last_edited: NaiveDateTime,
    pub last_visited: Option<NaiveDateTime>,
    pub source_book_id: Option<i32>,
    pub source_page: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cards)]
pub struct NewCard {
    pub owner_id: i32,
    pub front: String,
    pub back: String,
    pub example_original: Option<String>,
    pub example_translation: Option<String>,
    pub examples: String,
    pub synonyms: String,
    pub antonyms: String,
    pub part_of_speech: Option<String>,
    pub gender: Option<String>,
    pub plural_form: Option<String>,
    pub pronunciation: Option<String>,
    pub notes: Option<String>,
    pub tags: String,
    pub hardness_level: String,
    pub date_created: NaiveDateTime,
    pub last_edited: NaiveDateTime,
    pub source_book_id: Option<i32>,
    pub source_page: Option<i32>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = cards)]
pub struct CardChangeset {
    pub front: Option<String>,
    pub back: Option<String>,
    pub example_original: Option<String>,
    pub example_translation: Option<String>,
    pub examples: Option<String>,
    pub synonyms: Option<String>,
    pub antonyms: Option<String>,
    pub part_of_speech: Option<String>,
    pub gender: Option<String>,
    pub plural_form: Option<String>,
    pub pronunciation: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<String>,
    pub hardness_level: Option<String>,
    pub last_edited: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CardCreate {
    #[validate(length(min = 1, message = "Front must not be empty"))]
    pub front: String,
    #[validate(length(min = 1, message = "Back must not be empty"))]
    pub back: String,
    pub example_original: Option<String>,
    pub example_translation: Option<String>,
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
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub hardness_level: HardnessLevel,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CardUpdate {
    #[validate(length(min = 1, message = "Front must not be empty"))]
    pub front: Option<String>,
    #[validate(length(min = 1, message = "Back must not be empty"))]
    pub back: Option<String>,
    pub example_original: Option<String>,
    pub example_translation: Option<String>,
    pub examples: Option<Vec<ExampleSentence>>,
    pub synonyms: Option<Vec<String>>,
    pub antonyms: Option<Vec<String>>,
    pub part_of_speech: Option<String>,
    pub gender: Option<String>,
    pub plural_form: Option<String>,
    pub pronunciation: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub hardness_level: Option<HardnessLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: i32,
    pub front: String,
    pub back: String,
    pub example_original: Option<String>,
    pub example_translation: Option<String>,
    pub examples: Vec<ExampleSentence>,
    pub synonyms: Vec<String>,
    pub antonyms: Vec<String>,
    pub part_of_speech: Option<String>,
    pub gender: Option<String>,
    pub plural_form: Option<String>,
    pub pronunciation: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub hardness_level: HardnessLevel,
    pub date_created: NaiveDateTime,
    pub last_edited: NaiveDateTime,
    pub last_visited: Option<NaiveDateTime>,
    pub source_book_id: Option<i32>,
    pub source_page: Option<i32>,
}

impl TryFrom<CardRow> for Card {
    type Error = DieselError;

    fn try_from(row: CardRow) -> Result<Self, Self::Error> {
        let hardness_level = row
            .hardness_level
            .parse()
            .map_err(|e: String| DieselError::DeserializationError(e.into()))?;

        Ok(Card {
            id: row.card_id,
            examples: decode_column(&row.examples)?,
            synonyms: decode_column(&row.synonyms)?,
            antonyms: decode_column(&row.antonyms)?,
            tags: decode_column(&row.tags)?,
            front: row.front,
            back: row.back,
            example_original: row.example_original,
            example_translation: row.example_translation,
            part_of_speech: row.part_of_speech,
            gender: row.gender,
            plural_form: row.plural_form,
            pronunciation: row.pronunciation,
            notes: row.notes,
            hardness_level,
            date_created: row.date_created,
            last_edited: row.last_edited,
            last_visited: row.last_visited,
            source_book_id: row.source_book_id,
            source_page: row.source_page,
        })
    }
}

/// `skip`/`limit` listing parameters shared by the list endpoints.
#[derive(Debug, Deserialize, Validate)]
pub struct ListParams {
    #[serde(default)]
    #[validate(range(min = 0, message = "skip must not be negative"))]
    pub skip: i64,
    #[serde(default = "default_list_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: i64,
    pub tag: Option<String>,
}

fn default_list_limit() -> i64 {
    10
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_list_limit(),
            tag: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardness_level_round_trips_through_its_column_text() {
        for level in [HardnessLevel::Easy, HardnessLevel::Medium, HardnessLevel::Hard] {
            assert_eq!(level.as_str().parse::<HardnessLevel>(), Ok(level));
        }
        assert!("extreme".parse::<HardnessLevel>().is_err());
    }

    #[test]
    fn card_create_defaults_optional_lists() {
        let payload: CardCreate =
            serde_json::from_str(r#"{"front": "der Hund", "back": "the dog"}"#).unwrap();
        assert!(payload.tags.is_empty());
        assert!(payload.examples.is_empty());
        assert_eq!(payload.hardness_level, HardnessLevel::Medium);
    }

    #[test]
    fn card_row_with_corrupt_json_column_is_rejected() {
        let now = chrono::Utc::now().naive_utc();
        let row = CardRow {
            card_id: 1,
            owner_id: 1,
            front: "a".into(),
            back: "b".into(),
            example_original: None,
            example_translation: None,
            examples: "not json".into(),
            synonyms: "[]".into(),
            antonyms: "[]".into(),
            part_of_speech: None,
            gender: None,
            plural_form: None,
            pronunciation: None,
            notes: None,
            tags: "[]".into(),
            hardness_level: "easy".into(),
            date_created: now,
            last_edited: now,
            last_visited: None,
            source_book_id: None,
            source_page: None,
        };
        assert!(Card::try_from(row).is_err());
    }
}
