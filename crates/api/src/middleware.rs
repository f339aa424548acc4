//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use circle_core::{
    CommentService, FriendService, PostService, ReactionService, TokenService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub friend_service: FriendService,
    pub reaction_service: ReactionService,
    pub token_service: TokenService,
}

/// Outcome of reading the `Authorization` header.
///
/// Absent when the request carried no header at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallerIdentity {
    /// A valid token issued for this user ID.
    User(String),
    /// A header was sent but did not hold a valid token.
    Rejected(String),
}

/// Authentication middleware.
///
/// Resolves the bearer token into a [`CallerIdentity`] request extension.
/// Extractors decide whether a route needs one.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(AUTHORIZATION) {
        let identity = match auth_header
            .to_str()
            .ok()
            .and_then(|s| s.strip_prefix("Bearer "))
        {
            Some(token) => match state.token_service.verify(token.trim()) {
                Ok(user_id) => CallerIdentity::User(user_id),
                Err(e) => {
                    tracing::debug!(error = %e, "Rejected access token");
                    CallerIdentity::Rejected(e.to_string())
                }
            },
            None => CallerIdentity::Rejected("Token is invalid".to_string()),
        };

        req.extensions_mut().insert(identity);
    }

    next.run(req).await
}
