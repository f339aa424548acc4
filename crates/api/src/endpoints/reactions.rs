//! Reaction endpoints.

use axum::{Router, extract::State, routing::post};
use circle_common::AppResult;
use circle_core::SaveReactionInput;
use circle_db::repositories::ReactionTally;

use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// React to a post or comment; the same emoji twice removes the reaction.
async fn save(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SaveReactionInput>,
) -> AppResult<ApiResponse<ReactionTally>> {
    let tally = state.reaction_service.save(&caller_id, input).await?;
    Ok(ApiResponse::ok(tally, "Save reaction successfully"))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(save))
}
