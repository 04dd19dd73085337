use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::data::models::Card;

#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    #[validate(length(min = 1, message = "query must not be empty"))]
    pub query: String,
    pub cursor: Option<String>,
    #[serde(default = "default_search_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: i64,
}

fn default_search_limit() -> i64 {
    10
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<Card>,
    pub next_cursor: Option<String>,
}
