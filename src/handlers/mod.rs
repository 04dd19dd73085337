pub mod auth;
pub mod books;
pub mod cards;
pub mod decks;
pub mod generation;
pub mod search;
pub mod storage;
