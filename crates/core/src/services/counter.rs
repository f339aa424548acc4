//! Denormalized counter maintenance.
//!
//! Every counter is recomputed from scratch and written with a single
//! `UPDATE`, so repeating a recompute is harmless and a late one converges.

use crate::services::reaction::ReactionTarget;
use circle_common::AppResult;
use circle_db::repositories::{
    CommentRepository, FriendRepository, PostRepository, ReactionRepository, ReactionTally,
    UserRepository,
};

/// Counter service.
#[derive(Clone)]
pub struct CounterService {
    user_repo: UserRepository,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    friend_repo: FriendRepository,
    reaction_repo: ReactionRepository,
}

impl CounterService {
    /// Create a new counter service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        friend_repo: FriendRepository,
        reaction_repo: ReactionRepository,
    ) -> Self {
        Self {
            user_repo,
            post_repo,
            comment_repo,
            friend_repo,
            reaction_repo,
        }
    }

    /// Recount a user's non-deleted posts.
    pub async fn recompute_post_count(&self, user_id: &str) -> AppResult<u64> {
        let count = self.post_repo.count_active_by_author(user_id).await?;
        self.user_repo.set_post_count(user_id, count).await?;
        tracing::debug!(user_id = %user_id, count, "Recomputed post count");
        Ok(count)
    }

    /// Recount a post's non-deleted comments.
    pub async fn recompute_comment_count(&self, post_id: &str) -> AppResult<u64> {
        let count = self.comment_repo.count_active_by_post(post_id).await?;
        self.post_repo.set_comment_count(post_id, count).await?;
        tracing::debug!(post_id = %post_id, count, "Recomputed comment count");
        Ok(count)
    }

    /// Recount a user's accepted friendships.
    pub async fn recompute_friend_count(&self, user_id: &str) -> AppResult<u64> {
        let count = self.friend_repo.count_accepted(user_id).await?;
        self.user_repo.set_friend_count(user_id, count).await?;
        tracing::debug!(user_id = %user_id, count, "Recomputed friend count");
        Ok(count)
    }

    /// Recount the like/dislike tally of a post or comment.
    pub async fn recompute_reactions(&self, target: &ReactionTarget) -> AppResult<ReactionTally> {
        let tally = self
            .reaction_repo
            .tally(target.target_type(), target.id())
            .await?;

        match target {
            ReactionTarget::Post(id) => {
                self.post_repo
                    .set_reaction_counts(id, tally.like, tally.dislike)
                    .await?;
            }
            ReactionTarget::Comment(id) => {
                self.comment_repo
                    .set_reaction_counts(id, tally.like, tally.dislike)
                    .await?;
            }
        }

        tracing::debug!(target = ?target, like = tally.like, dislike = tally.dislike, "Recomputed reactions");
        Ok(tally)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
    }

    #[tokio::test]
    async fn test_recompute_post_count_writes_recount() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_ok()])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(4)]])
                .into_connection(),
        );

        let service = CounterService::new(
            UserRepository::new(user_db),
            PostRepository::new(post_db),
            CommentRepository::new(empty_db()),
            FriendRepository::new(empty_db()),
            ReactionRepository::new(empty_db()),
        );

        assert_eq!(service.recompute_post_count("u1").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_recompute_friend_count() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_ok()])
                .into_connection(),
        );
        let friend_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(1)]])
                .into_connection(),
        );

        let service = CounterService::new(
            UserRepository::new(user_db),
            PostRepository::new(empty_db()),
            CommentRepository::new(empty_db()),
            FriendRepository::new(friend_db),
            ReactionRepository::new(empty_db()),
        );

        assert_eq!(service.recompute_friend_count("u1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_recompute_reactions_updates_owning_comment() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_ok()])
                .into_connection(),
        );
        let reaction_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "emoji" => sea_orm::Value::from("dislike"),
                    "count" => sea_orm::Value::BigInt(Some(2)),
                }]])
                .into_connection(),
        );

        // The post table is never touched for a comment target.
        let service = CounterService::new(
            UserRepository::new(empty_db()),
            PostRepository::new(empty_db()),
            CommentRepository::new(comment_db),
            FriendRepository::new(empty_db()),
            ReactionRepository::new(reaction_db),
        );

        let tally = service
            .recompute_reactions(&ReactionTarget::Comment("c1".to_string()))
            .await
            .unwrap();

        assert_eq!(tally, ReactionTally { like: 0, dislike: 2 });
    }
}
