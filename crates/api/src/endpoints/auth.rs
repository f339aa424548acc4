//! Authentication endpoints.

use axum::{Router, extract::State, routing::post};
use circle_common::AppResult;
use circle_core::{AuthSession, LoginInput};
use serde::Serialize;

use super::users::UserResponse;
use crate::{extractors::ApiJson, middleware::AppState, response::ApiResponse};

/// A user and their access token.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserResponse,
    pub access_token: String,
}

impl From<AuthSession> for SessionResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.into(),
            access_token: session.access_token,
        }
    }
}

/// Log in with email and password.
async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let session = state.user_service.login(input).await?;
    Ok(ApiResponse::ok(session.into(), "Login successful"))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}
