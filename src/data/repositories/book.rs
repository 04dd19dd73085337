use diesel::prelude::*;

use crate::data::models::book_models::BookChangeset;
use crate::data::models::{BookRow, NewBook};
use crate::data::repositories::last_insert_id;
use crate::schema::{books, cards};

pub struct BookRepository;

impl BookRepository {
    pub fn insert(conn: &mut SqliteConnection, book: &NewBook) -> QueryResult<BookRow> {
        diesel::insert_into(books::table).values(book).execute(conn)?;
        let book_id = last_insert_id(conn)?;

        books::table
            .find(book_id)
            .select(BookRow::as_select())
            .first(conn)
    }

    pub fn find(
        conn: &mut SqliteConnection,
        owner_id: i32,
        book_id: i32,
    ) -> QueryResult<Option<BookRow>> {
        books::table
            .filter(books::book_id.eq(book_id))
            .filter(books::owner_id.eq(owner_id))
            .select(BookRow::as_select())
            .first(conn)
            .optional()
    }

    pub fn list(
        conn: &mut SqliteConnection,
        owner_id: i32,
        skip: i64,
        limit: i64,
    ) -> QueryResult<Vec<BookRow>> {
        books::table
            .filter(books::owner_id.eq(owner_id))
            .order(books::book_id.asc())
            .offset(skip)
            .limit(limit)
            .select(BookRow::as_select())
            .load(conn)
    }

    pub fn count(conn: &mut SqliteConnection, owner_id: i32) -> QueryResult<i64> {
        books::table
            .filter(books::owner_id.eq(owner_id))
            .count()
            .get_result(conn)
    }

    pub fn update(
        conn: &mut SqliteConnection,
        owner_id: i32,
        book_id: i32,
        changes: &BookChangeset,
    ) -> QueryResult<Option<BookRow>> {
        let updated = diesel::update(
            books::table
                .filter(books::book_id.eq(book_id))
                .filter(books::owner_id.eq(owner_id)),
        )
        .set(changes)
        .execute(conn)?;

        if updated == 0 {
            return Ok(None);
        }
        Self::find(conn, owner_id, book_id)
    }

    /// Removes the book; progress and drafts cascade, generated cards are
    /// detached from it.
    pub fn delete(conn: &mut SqliteConnection, owner_id: i32, book_id: i32) -> QueryResult<bool> {
        conn.transaction(|conn| {
            diesel::update(
                cards::table
                    .filter(cards::owner_id.eq(owner_id))
                    .filter(cards::source_book_id.eq(book_id)),
            )
            .set(cards::source_book_id.eq(None::<i32>))
            .execute(conn)?;

            let deleted = diesel::delete(
                books::table
                    .filter(books::book_id.eq(book_id))
                    .filter(books::owner_id.eq(owner_id)),
            )
            .execute(conn)?;
            Ok(deleted > 0)
        })
    }
}
