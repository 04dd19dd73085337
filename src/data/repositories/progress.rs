use chrono::Utc;
use diesel::prelude::*;

use crate::data::models::book_models::ProgressChangeset;
use crate::data::models::{BookProgressResponse, NewProgress, ProgressRow, decode_column, encode_column};
use crate::features::progress::ProgressState;
use crate::schema::book_progress;

pub struct ProgressRepository;

impl ProgressRow {
    pub fn state(&self) -> QueryResult<ProgressState> {
        Ok(ProgressState {
            current_page: self.current_page,
            current_chapter: self.current_chapter.clone(),
            pages_processed: decode_column(&self.pages_processed)?,
            chapters_completed: decode_column(&self.chapters_completed)?,
        })
    }

    pub fn into_response(self) -> QueryResult<BookProgressResponse> {
        let state = self.state()?;
        Ok(BookProgressResponse {
            id: self.progress_id,
            book_id: self.book_id,
            next_unprocessed_page: state.next_unprocessed_page(),
            current_page: state.current_page,
            current_chapter: state.current_chapter,
            pages_processed: state.pages_processed,
            chapters_completed: state.chapters_completed,
            date_created: self.date_created,
            last_edited: self.last_edited,
        })
    }
}

impl ProgressRepository {
    pub fn find(
        conn: &mut SqliteConnection,
        owner_id: i32,
        book_id: i32,
    ) -> QueryResult<Option<ProgressRow>> {
        book_progress::table
            .filter(book_progress::book_id.eq(book_id))
            .filter(book_progress::owner_id.eq(owner_id))
            .select(ProgressRow::as_select())
            .first(conn)
            .optional()
    }

    /// Returns the tracker of a book, creating an empty one on first use.
    /// The caller checks that the owner owns the book.
    pub fn get_or_create(
        conn: &mut SqliteConnection,
        owner_id: i32,
        book_id: i32,
    ) -> QueryResult<ProgressRow> {
        if let Some(progress) = Self::find(conn, owner_id, book_id)? {
            return Ok(progress);
        }

        let now = Utc::now().naive_utc();
        let fresh = ProgressState::default();
        diesel::insert_into(book_progress::table)
            .values(&NewProgress {
                book_id,
                owner_id,
                current_page: fresh.current_page,
                pages_processed: encode_column(&fresh.pages_processed)?,
                chapters_completed: encode_column(&fresh.chapters_completed)?,
                date_created: now,
                last_edited: now,
            })
            .on_conflict_do_nothing()
            .execute(conn)?;

        book_progress::table
            .filter(book_progress::book_id.eq(book_id))
            .filter(book_progress::owner_id.eq(owner_id))
            .select(ProgressRow::as_select())
            .first(conn)
    }

    pub fn save(
        conn: &mut SqliteConnection,
        progress_id: i32,
        state: &ProgressState,
    ) -> QueryResult<ProgressRow> {
        diesel::update(book_progress::table.find(progress_id))
            .set(&ProgressChangeset {
                current_page: state.current_page,
                current_chapter: state.current_chapter.clone(),
                pages_processed: encode_column(&state.pages_processed)?,
                chapters_completed: encode_column(&state.chapters_completed)?,
                last_edited: Utc::now().naive_utc(),
            })
            .execute(conn)?;

        book_progress::table
            .find(progress_id)
            .select(ProgressRow::as_select())
            .first(conn)
    }
}
