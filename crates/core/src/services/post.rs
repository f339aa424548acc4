//! Post service.

use std::collections::BTreeSet;

use circle_common::{AppError, AppResult, IdGenerator, Page, Pagination};
use circle_db::{
    entities::{post, user},
    repositories::{CommentRepository, FriendRepository, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::{comment::CommentView, counter::CounterService};

/// A post and its author.
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: post::Model,
    pub author: Option<user::Model>,
}

/// A post, its author and every live comment on it.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: post::Model,
    pub author: Option<user::Model>,
    pub comments: Vec<CommentView>,
}

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 10000, message = "Missing content"))]
    pub content: String,

    #[validate(length(max = 2048))]
    pub image: Option<String>,
}

/// Input for editing a post. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePostInput {
    #[validate(length(min = 1, max = 10000))]
    pub content: Option<String>,

    #[validate(length(max = 2048))]
    pub image: Option<String>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    user_repo: UserRepository,
    friend_repo: FriendRepository,
    counters: CounterService,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        user_repo: UserRepository,
        friend_repo: FriendRepository,
        counters: CounterService,
    ) -> Self {
        Self {
            post_repo,
            comment_repo,
            user_repo,
            friend_repo,
            counters,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a post.
    pub async fn create(&self, caller_id: &str, input: CreatePostInput) -> AppResult<PostView> {
        input.validate()?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            content: Set(input.content),
            image: Set(input.image.unwrap_or_default()),
            author_id: Set(caller_id.to_string()),
            is_deleted: Set(false),
            comment_count: Set(0),
            like_count: Set(0),
            dislike_count: Set(0),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let post = self.post_repo.create(model).await?;
        self.counters.recompute_post_count(caller_id).await?;

        let author = self.user_repo.find_by_id(caller_id).await?;
        Ok(PostView { post, author })
    }

    /// Edit a post. Only its author may do so.
    pub async fn update(
        &self,
        caller_id: &str,
        id: &str,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let post = self
            .post_repo
            .find_active_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Post not found", "Update Post Error"))?;

        if post.author_id != caller_id {
            return Err(AppError::forbidden(
                "Only author can edit post",
                "Update Post Error",
            ));
        }

        let mut active: post::ActiveModel = post.into();
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        if let Some(image) = input.image {
            active.image = Set(image);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.post_repo.update(active).await
    }

    /// Soft-delete a post. Only its author may do so.
    pub async fn delete(&self, caller_id: &str, id: &str) -> AppResult<post::Model> {
        let post = self
            .post_repo
            .find_active_by_id(id)
            .await?
            .filter(|p| p.author_id == caller_id)
            .ok_or_else(|| {
                AppError::not_found(
                    "Post not found or User cannot delete post",
                    "Delete Post Error",
                )
            })?;

        let mut active: post::ActiveModel = post.into();
        active.is_deleted = Set(true);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        let post = self.post_repo.update(active).await?;

        self.counters.recompute_post_count(caller_id).await?;
        tracing::debug!(post_id = %post.id, "Post deleted");

        Ok(post)
    }

    /// Get a post with its author and comments.
    pub async fn get(&self, id: &str) -> AppResult<PostDetail> {
        let post = self
            .post_repo
            .find_active_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Post not found", "Get Post Error"))?;

        let comments = self.comment_repo.find_all_by_post(id).await?;

        let author_ids: BTreeSet<String> = std::iter::once(post.author_id.clone())
            .chain(comments.iter().map(|c| c.author_id.clone()))
            .collect();
        let authors = self
            .user_repo
            .find_by_ids(&author_ids.into_iter().collect::<Vec<_>>())
            .await?;

        let author = find_author(&authors, &post.author_id);
        let comments = comments
            .into_iter()
            .map(|comment| CommentView {
                author: find_author(&authors, &comment.author_id),
                comment,
            })
            .collect();

        Ok(PostDetail {
            post,
            author,
            comments,
        })
    }

    /// Posts by a user and their friends, newest first.
    pub async fn feed(&self, user_id: &str, pagination: Pagination) -> AppResult<Page<PostView>> {
        if self.user_repo.find_active_by_id(user_id).await?.is_none() {
            return Err(AppError::not_found("User not found", "Get Posts Error"));
        }

        let mut author_ids: Vec<String> = self
            .friend_repo
            .find_accepted(user_id)
            .await?
            .iter()
            .map(|e| e.other_party(user_id).to_string())
            .collect();
        author_ids.push(user_id.to_string());

        let (posts, count) = self
            .post_repo
            .find_by_authors(&author_ids, pagination)
            .await?;

        let authors = self.authors_of(posts.iter().map(|p| &p.author_id)).await?;
        let views = posts
            .into_iter()
            .map(|post| PostView {
                author: find_author(&authors, &post.author_id),
                post,
            })
            .collect();

        Ok(pagination.page_of(views, count))
    }

    /// One page of a post's comments, newest first.
    pub async fn comments(
        &self,
        post_id: &str,
        pagination: Pagination,
    ) -> AppResult<Page<CommentView>> {
        if self.post_repo.find_active_by_id(post_id).await?.is_none() {
            return Err(AppError::not_found("Post not found", "Get Comments Error"));
        }

        let (comments, count) = self.comment_repo.find_by_post(post_id, pagination).await?;

        let authors = self
            .authors_of(comments.iter().map(|c| &c.author_id))
            .await?;
        let views = comments
            .into_iter()
            .map(|comment| CommentView {
                author: find_author(&authors, &comment.author_id),
                comment,
            })
            .collect();

        Ok(pagination.page_of(views, count))
    }

    async fn authors_of<'a>(
        &self,
        ids: impl Iterator<Item = &'a String>,
    ) -> AppResult<Vec<user::Model>> {
        let ids: BTreeSet<String> = ids.cloned().collect();
        self.user_repo
            .find_by_ids(&ids.into_iter().collect::<Vec<_>>())
            .await
    }
}

pub(crate) fn find_author(authors: &[user::Model], id: &str) -> Option<user::Model> {
    authors.iter().find(|u| u.id == id).cloned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use circle_db::{
        entities::comment,
        repositories::ReactionRepository,
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    const ALICE: &str = "01hv0000000000000000000001";
    const BOB: &str = "01hv0000000000000000000002";
    const POST_ID: &str = "01hv00000000000000000000p1";

    fn create_test_post(author: &str, is_deleted: bool) -> post::Model {
        post::Model {
            id: POST_ID.to_string(),
            content: "hello".to_string(),
            image: String::new(),
            author_id: author.to_string(),
            is_deleted,
            comment_count: 0,
            like_count: 0,
            dislike_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_comment(id: &str, author: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            content: "nice".to_string(),
            author_id: author.to_string(),
            post_id: POST_ID.to_string(),
            is_deleted: false,
            like_count: 0,
            dislike_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: id.to_string(),
            email: format!("{id}@example.com"),
            password: "hash".to_string(),
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

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn create_test_service(
        post_db: Arc<DatabaseConnection>,
        comment_db: Arc<DatabaseConnection>,
        user_db: Arc<DatabaseConnection>,
        friend_db: Arc<DatabaseConnection>,
    ) -> PostService {
        let post_repo = PostRepository::new(post_db);
        let comment_repo = CommentRepository::new(comment_db);
        let user_repo = UserRepository::new(user_db);
        let friend_repo = FriendRepository::new(friend_db);
        let counters = CounterService::new(
            user_repo.clone(),
            post_repo.clone(),
            comment_repo.clone(),
            friend_repo.clone(),
            ReactionRepository::new(empty_db()),
        );
        PostService::new(post_repo, comment_repo, user_repo, friend_repo, counters)
    }

    #[tokio::test]
    async fn test_create_recomputes_post_count() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post(ALICE, false)]])
                .append_query_results([[count_row(1)]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_ok()])
                .append_query_results([[create_test_user(ALICE)]])
                .into_connection(),
        );
        let service = create_test_service(post_db, empty_db(), user_db, empty_db());

        let view = service
            .create(
                ALICE,
                CreatePostInput {
                    content: "hello".to_string(),
                    image: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(view.post.author_id, ALICE);
        assert_eq!(view.author.unwrap().id, ALICE);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_content() {
        let service = create_test_service(empty_db(), empty_db(), empty_db(), empty_db());

        let result = service
            .create(
                ALICE,
                CreatePostInput {
                    content: String::new(),
                    image: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_by_other_user_is_forbidden() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post(ALICE, false)]])
                .into_connection(),
        );
        let service = create_test_service(post_db, empty_db(), empty_db(), empty_db());

        let err = service
            .update(BOB, POST_ID, UpdatePostInput::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Only author can edit post");
    }

    #[tokio::test]
    async fn test_soft_delete_recounts_posts() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post(ALICE, false)]])
                .append_query_results([[create_test_post(ALICE, true)]])
                // The deleted post no longer counts.
                .append_query_results([[count_row(0)]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_ok()])
                .into_connection(),
        );
        let service = create_test_service(post_db, empty_db(), user_db, empty_db());

        let post = service.delete(ALICE, POST_ID).await.unwrap();

        assert!(post.is_deleted);
    }

    #[tokio::test]
    async fn test_delete_by_other_user() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post(ALICE, false)]])
                .into_connection(),
        );
        let service = create_test_service(post_db, empty_db(), empty_db(), empty_db());

        let err = service.delete(BOB, POST_ID).await.unwrap_err();

        assert_eq!(err.error_type(), "Delete Post Error");
    }

    #[tokio::test]
    async fn test_get_includes_comments_with_authors() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post(ALICE, false)]])
                .into_connection(),
        );
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_comment("01hv00000000000000000000c2", BOB),
                    create_test_comment("01hv00000000000000000000c1", ALICE),
                ]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user(ALICE), create_test_user(BOB)]])
                .into_connection(),
        );
        let service = create_test_service(post_db, comment_db, user_db, empty_db());

        let detail = service.get(POST_ID).await.unwrap();

        assert_eq!(detail.author.unwrap().id, ALICE);
        assert_eq!(detail.comments.len(), 2);
        assert_eq!(detail.comments[0].author.as_ref().unwrap().id, BOB);
        assert_eq!(detail.comments[1].author.as_ref().unwrap().id, ALICE);
    }

    #[tokio::test]
    async fn test_get_deleted_post_is_not_found() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = create_test_service(post_db, empty_db(), empty_db(), empty_db());

        let err = service.get(POST_ID).await.unwrap_err();

        assert_eq!(err.to_string(), "Post not found");
    }

    #[tokio::test]
    async fn test_feed_pages_over_user_and_friends() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user(ALICE)]])
                .append_query_results([[create_test_user(BOB)]])
                .into_connection(),
        );
        let friend_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[circle_db::entities::friend::Model {
                    id: "01hv00000000000000000000f1".to_string(),
                    from_id: BOB.to_string(),
                    to_id: ALICE.to_string(),
                    status: circle_db::entities::friend::FriendStatus::Accepted,
                    created_at: Utc::now().into(),
                    updated_at: None,
                }]])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(25)]])
                .append_query_results([[create_test_post(BOB, false)]])
                .into_connection(),
        );
        let service = create_test_service(post_db, empty_db(), user_db, friend_db);

        let page = service
            .feed(ALICE, Pagination::new(Some(2), Some(10)))
            .await
            .unwrap();

        assert_eq!(page.count, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items[0].author.as_ref().unwrap().id, BOB);
    }
}
