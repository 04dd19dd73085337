use chrono::NaiveDateTime;
use diesel::result::Error as DieselError;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::data::models::decode_column;
use crate::schema::{book_progress, books};

/// Named span of pages inside a book, both ends inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_chapter_span"))]
pub struct Chapter {
    #[validate(length(min = 1, message = "Chapter name must not be empty"))]
    pub name: String,
    #[validate(range(min = 1, message = "Chapter pages start at 1"))]
    pub start_page: i32,
    pub end_page: i32,
}

fn validate_chapter_span(chapter: &Chapter) -> Result<(), ValidationError> {
    if chapter.end_page < chapter.start_page {
        let mut err = ValidationError::new("chapter_span");
        err.message = Some("Chapter end_page must not precede start_page".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_chapters(chapters: &[Chapter]) -> Result<(), ValidationErrors> {
    chapters.iter().try_for_each(|chapter| chapter.validate())
}

/// Processed page range, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRange {
    pub start: i32,
    pub end: i32,
}

impl PageRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, page: i32) -> bool {
        self.start <= page && page <= self.end
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BookRow {
    pub book_id: i32,
    pub owner_id: i32,
    pub title: String,
    pub filename: String,
    pub file_size_bytes: i64,
    pub total_pages: i32,
    pub chapters: String,
    pub storage_file_id: String,
    pub storage_type: String,
    pub target_language: Option<String>,
    pub native_language: Option<String>,
    pub date_created: NaiveDateTime,
    pub last_edited: NaiveDateTime,
}

impl BookRow {
    pub fn chapter_list(&self) -> Result<Vec<Chapter>, DieselError> {
        decode_column(&self.chapters)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = books)]
pub struct NewBook {
    pub owner_id: i32,
    pub title: String,
    pub filename: String,
    pub file_size_bytes: i64,
    pub total_pages: i32,
    pub chapters: String,
    pub storage_file_id: String,
    pub storage_type: String,
    pub target_language: Option<String>,
    pub native_language: Option<String>,
    pub date_created: NaiveDateTime,
    pub last_edited: NaiveDateTime,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = books)]
pub struct BookChangeset {
    pub title: Option<String>,
    pub target_language: Option<String>,
    pub native_language: Option<String>,
    pub chapters: Option<String>,
    pub last_edited: NaiveDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BookUpdate {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub target_language: Option<String>,
    pub native_language: Option<String>,
    pub chapters: Option<Vec<Chapter>>,
}

/// `skip`/`limit` of the book listing
#[derive(Debug, Deserialize, Validate)]
pub struct BookListParams {
    #[serde(default)]
    #[validate(range(min = 0, message = "skip must not be negative"))]
    pub skip: i64,
    #[serde(default = "default_book_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: i64,
}

fn default_book_limit() -> i64 {
    100
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: i32,
    pub title: String,
    pub filename: String,
    pub file_size_bytes: i64,
    pub total_pages: i32,
    pub chapters: Vec<Chapter>,
    pub storage_type: String,
    pub target_language: Option<String>,
    pub native_language: Option<String>,
    pub date_created: NaiveDateTime,
    pub last_edited: NaiveDateTime,
}

impl TryFrom<BookRow> for BookResponse {
    type Error = DieselError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        Ok(BookResponse {
            chapters: row.chapter_list()?,
            id: row.book_id,
            title: row.title,
            filename: row.filename,
            file_size_bytes: row.file_size_bytes,
            total_pages: row.total_pages,
            storage_type: row.storage_type,
            target_language: row.target_language,
            native_language: row.native_language,
            date_created: row.date_created,
            last_edited: row.last_edited,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = book_progress)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProgressRow {
    pub progress_id: i32,
    pub book_id: i32,
    pub owner_id: i32,
    pub current_page: i32,
    pub current_chapter: Option<String>,
    pub pages_processed: String,
    pub chapters_completed: String,
    pub date_created: NaiveDateTime,
    pub last_edited: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = book_progress)]
pub struct NewProgress {
    pub book_id: i32,
    pub owner_id: i32,
    pub current_page: i32,
    pub pages_processed: String,
    pub chapters_completed: String,
    pub date_created: NaiveDateTime,
    pub last_edited: NaiveDateTime,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = book_progress)]
pub struct ProgressChangeset {
    pub current_page: i32,
    pub current_chapter: Option<String>,
    pub pages_processed: String,
    pub chapters_completed: String,
    pub last_edited: NaiveDateTime,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct BookProgressUpdate {
    #[validate(range(min = 1, message = "current_page starts at 1"))]
    pub current_page: Option<i32>,
    pub current_chapter: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookProgressResponse {
    pub id: i32,
    pub book_id: i32,
    pub current_page: i32,
    pub current_chapter: Option<String>,
    pub pages_processed: Vec<PageRange>,
    pub chapters_completed: Vec<String>,
    pub next_unprocessed_page: i32,
    pub date_created: NaiveDateTime,
    pub last_edited: NaiveDateTime,
}
