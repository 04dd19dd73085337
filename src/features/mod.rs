pub mod auth;
pub mod errors;
pub mod generation;
pub mod progress;
pub mod search;
pub mod storage;
