pub mod auth_models;
pub mod book_models;
pub mod card_models;
pub mod deck_models;
pub mod draft_models;
pub mod error_models;
pub mod generation_models;
pub mod search_models;
pub mod storage_models;
pub mod user_models;

pub use auth_models::{LoginForm, Token, UserCreate};
pub use book_models::{
    BookListParams, BookProgressResponse, BookProgressUpdate, BookResponse, BookRow, BookUpdate,
    Chapter, NewBook, NewProgress, PageRange, ProgressRow,
};
pub use card_models::{Card, CardCreate, CardRow, CardUpdate, ExampleSentence, HardnessLevel, ListParams};
pub use deck_models::{ApiResponse, Deck, DeckCreate, DeckRow, DeckUpdate, Detail};
pub use draft_models::{
    ApproveParams, BulkApproveRequest, DraftCardResponse, DraftCardUpdate, DraftFilter,
    DraftRow, DraftStatus, RejectedCleanupParams,
};
pub use error_models::ApiError;
pub use generation_models::{
    GenerateFromRangeRequest, GenerateNextBatchRequest, GeneratedCard, GenerationResponse,
};
pub use search_models::{SearchParams, SearchResponse};
pub use storage_models::{
    GoogleCredentials, GoogleDriveAuthResponse, OAuthCallbackParams, StorageConfigResponse,
    StorageKind, StorageQuota, TelegramStorageConfig,
};
pub use user_models::{NewUser, User, UserOut};

use diesel::result::Error as DieselError;
use serde::{Serialize, de::DeserializeOwned};

/// Decodes a JSON text column into its typed value.
pub fn decode_column<T: DeserializeOwned>(raw: &str) -> Result<T, DieselError> {
    serde_json::from_str(raw).map_err(|e| DieselError::DeserializationError(Box::new(e)))
}

/// Encodes a value for storage in a JSON text column.
pub fn encode_column<T: Serialize + ?Sized>(value: &T) -> Result<String, DieselError> {
    serde_json::to_string(value).map_err(|e| DieselError::SerializationError(Box::new(e)))
}
