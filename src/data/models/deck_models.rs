use chrono::NaiveDateTime;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::data::models::Card;
use crate::schema::decks;

/// Deck row; card membership lives in `deck_cards`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = decks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DeckRow {
    pub deck_id: i32,
    pub owner_id: i32,
    pub deck_name: String,
    pub description: Option<String>,
    pub date_created: NaiveDateTime,
    pub last_edited: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = decks)]
pub struct NewDeck<'a> {
    pub owner_id: i32,
    pub deck_name: &'a str,
    pub description: Option<&'a str>,
    pub date_created: NaiveDateTime,
    pub last_edited: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = decks)]
pub struct DeckChangeset<'a> {
    pub deck_name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub last_edited: NaiveDateTime,
}

/// Request payload for creating a new deck
#[derive(Debug, Deserialize, Validate)]
pub struct DeckCreate {
    #[validate(length(min = 1, max = 200, message = "Deck name must be 1-200 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub card_ids: Vec<i32>,
}

/// Partial update; `card_ids` replaces the whole card list when present
#[derive(Debug, Default, Deserialize, Validate)]
pub struct DeckUpdate {
    #[validate(length(min = 1, max = 200, message = "Deck name must be 1-200 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub card_ids: Option<Vec<i32>>,
}

/// A deck with its cards in stored order
#[derive(Debug, Serialize, Deserialize)]
pub struct Deck {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub cards: Vec<Card>,
    pub date_created: NaiveDateTime,
    pub last_edited: NaiveDateTime,
}

impl Deck {
    pub fn from_row(row: DeckRow, cards: Vec<Card>) -> Self {
        Self {
            id: row.deck_id,
            name: row.deck_name,
            description: row.description,
            cards,
            date_created: row.date_created,
            last_edited: row.last_edited,
        }
    }
}

/// Standard API response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// `{"detail": ...}` acknowledgement returned by deletions
#[derive(Debug, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
}

impl Detail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
