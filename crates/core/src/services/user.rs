//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use circle_common::{AppError, AppResult, IdGenerator, NameFilter, Page, Pagination};
use circle_db::{
    entities::{friend, user},
    repositories::{FriendRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::token::TokenService;

/// A user together with the caller's friendship edge to them, if any.
#[derive(Debug, Clone)]
pub struct UserWithFriendship {
    pub user: user::Model,
    pub friendship: Option<friend::Model>,
}

/// A user and a freshly issued access token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: user::Model,
    pub access_token: String,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 100, message = "Invalid name"))]
    pub name: String,

    #[validate(email(message = "Invalid email"))]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "Invalid password"))]
    pub password: String,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email(message = "Invalid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Invalid password"))]
    pub password: String,
}

/// Input for updating a profile. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 2048))]
    pub avatar_url: Option<String>,
    #[validate(length(max = 2048))]
    pub cover_url: Option<String>,
    #[validate(length(max = 2048))]
    pub about_me: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 100))]
    pub company: Option<String>,
    #[validate(length(max = 100))]
    pub job_title: Option<String>,
    #[validate(length(max = 2048))]
    pub facebook_link: Option<String>,
    #[validate(length(max = 2048))]
    pub instagram_link: Option<String>,
    #[validate(length(max = 2048))]
    pub linkedin_link: Option<String>,
    #[validate(length(max = 2048))]
    pub twitter_link: Option<String>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    friend_repo: FriendRepository,
    tokens: TokenService,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        friend_repo: FriendRepository,
        tokens: TokenService,
    ) -> Self {
        Self {
            user_repo,
            friend_repo,
            tokens,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user and log them in.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthSession> {
        input.validate()?;

        let email = normalize_email(&input.email);
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(user_exists());
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name.trim().to_string()),
            email: Set(email.clone()),
            password: Set(password_hash),
            post_count: Set(0),
            friend_count: Set(0),
            is_deleted: Set(false),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let user = match self.user_repo.create(model).await {
            Ok(user) => user,
            Err(err) => {
                // A concurrent registration may have taken the email after the check.
                if self.user_repo.find_by_email(&email).await?.is_some() {
                    return Err(user_exists());
                }
                return Err(err);
            }
        };
        tracing::info!(user_id = %user.id, "User registered");

        let access_token = self.tokens.issue(&user.id)?;
        Ok(AuthSession { user, access_token })
    }

    /// Log in with email and password.
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthSession> {
        input.validate()?;

        let email = normalize_email(&input.email);
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| AppError::bad_request("Invalid credentials", "Login Error"))?;

        if !verify_password(&input.password, &user.password)? {
            return Err(AppError::bad_request("Wrong password", "Login Error"));
        }

        let access_token = self.tokens.issue(&user.id)?;
        Ok(AuthSession { user, access_token })
    }

    /// Get the caller's own record.
    pub async fn get_me(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_active_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Current user not found", "Get Current User Error"))
    }

    /// Get a user along with the caller's friendship to them.
    pub async fn get(&self, caller_id: &str, id: &str) -> AppResult<UserWithFriendship> {
        let user = self
            .user_repo
            .find_active_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", "Get Single User Error"))?;

        let friendship = self.friend_repo.find_between(caller_id, id).await?;

        Ok(UserWithFriendship { user, friendship })
    }

    /// List users, newest first, each with the caller's friendship.
    pub async fn list(
        &self,
        caller_id: &str,
        name: Option<&NameFilter>,
        pagination: Pagination,
    ) -> AppResult<Page<UserWithFriendship>> {
        let (users, count) = self.user_repo.search(None, name, pagination).await?;

        let ids: Vec<String> = users.iter().map(|u| u.id.clone()).collect();
        let edges = self.friend_repo.find_between_many(caller_id, &ids).await?;

        Ok(pagination.page_of(with_friendships(caller_id, users, &edges), count))
    }

    /// Update a profile. Users may only update themselves.
    pub async fn update_profile(
        &self,
        caller_id: &str,
        id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        if caller_id != id {
            return Err(AppError::forbidden("Permission required", "Update User Error"));
        }

        let user = self
            .user_repo
            .find_active_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", "Update User Error"))?;

        let mut active: user::ActiveModel = user.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(v) = input.avatar_url {
            active.avatar_url = Set(Some(v));
        }
        if let Some(v) = input.cover_url {
            active.cover_url = Set(Some(v));
        }
        if let Some(v) = input.about_me {
            active.about_me = Set(Some(v));
        }
        if let Some(v) = input.city {
            active.city = Set(Some(v));
        }
        if let Some(v) = input.country {
            active.country = Set(Some(v));
        }
        if let Some(v) = input.company {
            active.company = Set(Some(v));
        }
        if let Some(v) = input.job_title {
            active.job_title = Set(Some(v));
        }
        if let Some(v) = input.facebook_link {
            active.facebook_link = Set(Some(v));
        }
        if let Some(v) = input.instagram_link {
            active.instagram_link = Set(Some(v));
        }
        if let Some(v) = input.linkedin_link {
            active.linkedin_link = Set(Some(v));
        }
        if let Some(v) = input.twitter_link {
            active.twitter_link = Set(Some(v));
        }

        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }
}

/// Pair each user with the edge between them and `caller_id` found in `edges`.
pub(crate) fn with_friendships(
    caller_id: &str,
    users: Vec<user::Model>,
    edges: &[friend::Model],
) -> Vec<UserWithFriendship> {
    users
        .into_iter()
        .map(|user| {
            let friendship = edges
                .iter()
                .find(|e| e.involves(caller_id) && e.other_party(caller_id) == user.id)
                .cloned();
            UserWithFriendship { user, friendship }
        })
        .collect()
}

fn user_exists() -> AppError {
    AppError::conflict("User already exists", "Registration Error")
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use circle_common::config::AuthConfig;
    use circle_db::entities::friend::FriendStatus;
    use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, email: &str, password: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            avatar_url: None,
            cover_url: None,
            about_me: None,
            city: None,
            country: None,
            company: None,
            job_title: None,
            facebook_link: None,
            instagram_link: None,
            linkedin_link: None,
            twitter_link: None,
            post_count: 0,
            friend_count: 0,
            is_deleted: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_edge(from: &str, to: &str, status: FriendStatus) -> friend::Model {
        friend::Model {
            id: format!("{from}-{to}"),
            from_id: from.to_string(),
            to_id: to.to_string(),
            status,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_service(
        user_db: Arc<DatabaseConnection>,
        friend_db: Arc<DatabaseConnection>,
    ) -> UserService {
        UserService::new(
            UserRepository::new(user_db),
            FriendRepository::new(friend_db),
            TokenService::new(&AuthConfig {
                jwt_secret: "test-secret".to_string(),
                token_ttl_secs: 3600,
            }),
        )
    }

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    // Unit tests for password functions
    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("test", "invalid_hash").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn test_with_friendships_matches_either_direction() {
        let users = vec![
            create_test_user("bob", "bob@example.com", "x"),
            create_test_user("carol", "carol@example.com", "x"),
            create_test_user("dave", "dave@example.com", "x"),
        ];
        let edges = vec![
            create_test_edge("alice", "bob", FriendStatus::Pending),
            create_test_edge("carol", "alice", FriendStatus::Accepted),
        ];

        let result = with_friendships("alice", users, &edges);

        assert_eq!(
            result[0].friendship.as_ref().unwrap().status,
            FriendStatus::Pending
        );
        assert_eq!(
            result[1].friendship.as_ref().unwrap().status,
            FriendStatus::Accepted
        );
        assert!(result[2].friendship.is_none());
    }

    #[tokio::test]
    async fn test_register_existing_email_conflicts() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u1", "alice@example.com", "x")]])
                .into_connection(),
        );
        let service = create_test_service(user_db, empty_db());

        let result = service
            .register(RegisterInput {
                name: "Alice".to_string(),
                email: "ALICE@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await;

        match result {
            Err(AppError::Conflict { error_type, .. }) => {
                assert_eq!(error_type, "Registration Error");
            }
            other => panic!("Expected Conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_losing_insert_race_conflicts() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_errors([DbErr::Custom(
                    "duplicate key value violates unique constraint".to_string(),
                )])
                .append_query_results([[create_test_user("u2", "alice@example.com", "x")]])
                .into_connection(),
        );
        let service = create_test_service(user_db, empty_db());

        let err = service
            .register(RegisterInput {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap_err();

        assert!(!err.is_server_error());
        assert_eq!(err.error_type(), "Registration Error");
        assert_eq!(err.to_string(), "User already exists");
    }

    #[tokio::test]
    async fn test_register_other_insert_failure_is_server_error() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_errors([DbErr::Custom("connection reset".to_string())])
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = create_test_service(user_db, empty_db());

        let err = service
            .register(RegisterInput {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap_err();

        assert!(err.is_server_error());
    }

    #[tokio::test]
    async fn test_register_issues_token() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[create_test_user("u1", "alice@example.com", "hash")]])
                .into_connection(),
        );
        let service = create_test_service(user_db, empty_db());

        let session = service
            .register(RegisterInput {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(session.user.id, "u1");
        assert!(!session.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let service = create_test_service(empty_db(), empty_db());

        let result = service
            .register(RegisterInput {
                name: "Alice".to_string(),
                email: "not-an-email".to_string(),
                password: "secret".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login() {
        let hash = hash_password("secret").unwrap();
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u1", "alice@example.com", &hash)]])
                .append_query_results([[create_test_user("u1", "alice@example.com", &hash)]])
                .into_connection(),
        );
        let service = create_test_service(user_db, empty_db());

        let session = service
            .login(LoginInput {
                email: "alice@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(session.user.id, "u1");

        let result = service
            .login(LoginInput {
                email: "alice@example.com".to_string(),
                password: "wrong".to_string(),
            })
            .await;
        match result {
            Err(AppError::BadRequest { message, .. }) => assert_eq!(message, "Wrong password"),
            other => panic!("Expected BadRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_profile_of_someone_else_is_forbidden() {
        let service = create_test_service(empty_db(), empty_db());

        let result = service
            .update_profile("alice", "bob", UpdateProfileInput::default())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_get_attaches_friendship() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("bob", "bob@example.com", "x")]])
                .into_connection(),
        );
        let friend_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_edge("bob", "alice", FriendStatus::Pending)]])
                .into_connection(),
        );
        let service = create_test_service(user_db, friend_db);

        let result = service.get("alice", "bob").await.unwrap();

        assert_eq!(result.user.id, "bob");
        assert_eq!(result.friendship.unwrap().from_id, "bob");
    }

    #[tokio::test]
    async fn test_get_me_not_found() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = create_test_service(user_db, empty_db());

        assert!(matches!(
            service.get_me("ghost").await,
            Err(AppError::NotFound { .. })
        ));
    }
}
