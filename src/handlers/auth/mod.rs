use axum::Router;
use axum::routing::{get, post};

use crate::AppState;

mod login;
mod register;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register::handle_register))
        .route("/login", post(login::handle_login))
        .route("/me", get(login::current_user))
}
