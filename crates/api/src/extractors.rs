//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use circle_common::{AppError, IdGenerator};
use serde::de::DeserializeOwned;

use crate::middleware::CallerIdentity;

/// Authenticated user extractor, yielding the caller's user ID.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        match parts.extensions.get::<CallerIdentity>() {
            Some(CallerIdentity::User(id)) => Ok(Self(id.clone())),
            Some(CallerIdentity::Rejected(reason)) => Err(AppError::Unauthorized(reason.clone())),
            None => Err(AppError::Unauthorized("Login required".to_string())),
        }
    }
}

/// Optional authenticated user extractor.
///
/// Anonymous requests pass; a header holding a bad token is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<String>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<CallerIdentity>() {
            Some(CallerIdentity::User(id)) => Ok(Self(Some(id.clone()))),
            Some(CallerIdentity::Rejected(reason)) => Err(AppError::Unauthorized(reason.clone())),
            None => Ok(Self(None)),
        }
    }
}

/// JSON body whose parse failures are reported as validation errors.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        Ok(Self(value))
    }
}

/// A single path parameter that must be a well-formed ID.
#[derive(Debug, Clone)]
pub struct PathId(pub String);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        if !IdGenerator::is_valid(&id) {
            return Err(AppError::Validation("Invalid ID".to_string()));
        }

        Ok(Self(IdGenerator::normalize(&id)))
    }
}
