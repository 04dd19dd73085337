use std::fmt;
use std::str::FromStr;

use crate::data::models::ApiError;

/// Opaque position marker handed to clients between search pages.
///
/// It carries the identifier of the first record of the next page, so a
/// follow-up query resumes at identifiers `>=` the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor(pub i32);

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cursor {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i32>()
            .ok()
            .filter(|id| *id > 0)
            .map(Cursor)
            .ok_or_else(|| ApiError::validation(format!("Invalid cursor: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<Cursor>,
}

/// Splits a `limit + 1` lookahead fetch into one page and the next cursor.
///
/// `rows` must already be ordered by identifier ascending.
pub fn paginate<T>(mut rows: Vec<T>, limit: usize, id_of: impl Fn(&T) -> i32) -> Page<T> {
    let next_cursor = if rows.len() > limit {
        let lookahead = rows.swap_remove(limit);
        rows.truncate(limit);
        Some(Cursor(id_of(&lookahead)))
    } else {
        None
    };

    Page {
        items: rows,
        next_cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_fetch_is_the_last_page() {
        let page = paginate(vec![1, 2, 3], 5, |id| *id);
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn exact_fetch_is_the_last_page() {
        let page = paginate(vec![4, 5], 2, |id| *id);
        assert_eq!(page.items, vec![4, 5]);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn lookahead_row_becomes_cursor_and_is_excluded() {
        let page = paginate(vec![2, 4, 9], 2, |id| *id);
        assert_eq!(page.items, vec![2, 4]);
        assert_eq!(page.next_cursor, Some(Cursor(9)));
    }

    #[test]
    fn cursor_parses_only_positive_ids() {
        assert_eq!("42".parse::<Cursor>().unwrap(), Cursor(42));
        assert!("0".parse::<Cursor>().is_err());
        assert!("abc".parse::<Cursor>().is_err());
        assert_eq!(Cursor(17).to_string(), "17");
    }
}
