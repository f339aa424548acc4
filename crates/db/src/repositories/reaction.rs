//! Reaction repository.

use std::sync::Arc;

use crate::entities::{
    Reaction,
    reaction::{self, Emoji, TargetType},
};
use circle_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, ModelTrait,
    QueryFilter, QuerySelect, sea_query::Expr,
};
use serde::Serialize;

/// Like/dislike totals for one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReactionTally {
    pub like: u64,
    pub dislike: u64,
}

#[derive(Debug, FromQueryResult)]
struct EmojiCount {
    emoji: Emoji,
    count: i64,
}

/// Reaction repository for database operations.
#[derive(Clone)]
pub struct ReactionRepository {
    db: Arc<DatabaseConnection>,
}

impl ReactionRepository {
    /// Create a new reaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the reaction a user left on a target.
    pub async fn find_by_author_and_target(
        &self,
        author_id: &str,
        target_type: TargetType,
        target_id: &str,
    ) -> AppResult<Option<reaction::Model>> {
        Reaction::find()
            .filter(reaction::Column::AuthorId.eq(author_id))
            .filter(reaction::Column::TargetType.eq(target_type))
            .filter(reaction::Column::TargetId.eq(target_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new reaction.
    pub async fn create(&self, model: reaction::ActiveModel) -> AppResult<reaction::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a reaction.
    pub async fn update(&self, model: reaction::ActiveModel) -> AppResult<reaction::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a reaction.
    pub async fn delete(&self, model: reaction::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count reactions on a target grouped by emoji.
    pub async fn tally(&self, target_type: TargetType, target_id: &str) -> AppResult<ReactionTally> {
        let rows = Reaction::find()
            .select_only()
            .column(reaction::Column::Emoji)
            .column_as(Expr::col(reaction::Column::Id).count(), "count")
            .filter(reaction::Column::TargetType.eq(target_type))
            .filter(reaction::Column::TargetId.eq(target_id))
            .group_by(reaction::Column::Emoji)
            .into_model::<EmojiCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .fold(ReactionTally::default(), |mut tally, row| {
                let n = row.count.max(0) as u64;
                match row.emoji {
                    Emoji::Like => tally.like += n,
                    Emoji::Dislike => tally.dislike += n,
                }
                tally
            }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_reaction(id: &str, author_id: &str, emoji: Emoji) -> reaction::Model {
        reaction::Model {
            id: id.to_string(),
            target_type: TargetType::Post,
            target_id: "p1".to_string(),
            author_id: author_id.to_string(),
            emoji,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_author_and_target() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_reaction("r1", "u1", Emoji::Like)]])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let found = repo
            .find_by_author_and_target("u1", TargetType::Post, "p1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.emoji, Emoji::Like);
    }

    #[tokio::test]
    async fn test_tally_groups_by_emoji() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    maplit::btreemap! {
                        "emoji" => sea_orm::Value::from("like"),
                        "count" => sea_orm::Value::BigInt(Some(3)),
                    },
                    maplit::btreemap! {
                        "emoji" => sea_orm::Value::from("dislike"),
                        "count" => sea_orm::Value::BigInt(Some(1)),
                    },
                ]])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let tally = repo.tally(TargetType::Post, "p1").await.unwrap();

        assert_eq!(tally, ReactionTally { like: 3, dislike: 1 });
    }

    #[tokio::test]
    async fn test_tally_without_reactions_is_zero() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<std::collections::BTreeMap<&str, sea_orm::Value>>::new()])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let tally = repo.tally(TargetType::Comment, "c1").await.unwrap();

        assert_eq!(tally, ReactionTally::default());
    }
}
