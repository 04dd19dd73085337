pub mod book;
pub mod card;
pub mod deck;
pub mod draft;
pub mod progress;
pub mod user;

pub use book::BookRepository;
pub use card::CardRepository;
pub use deck::DeckRepository;
pub use draft::DraftRepository;
pub use progress::ProgressRepository;
pub use user::UserRepository;

use diesel::prelude::*;
use diesel::sql_types::Integer;

/// Row id of the last `INSERT` on this connection.
pub(crate) fn last_insert_id(conn: &mut SqliteConnection) -> QueryResult<i32> {
    diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()")).get_result(conn)
}

/// `%term%` pattern with LIKE wildcards escaped by `\`.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
