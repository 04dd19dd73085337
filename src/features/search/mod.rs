pub mod pagination;

pub use pagination::{Cursor, Page, paginate};
