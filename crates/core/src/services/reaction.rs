//! Reaction service.

use circle_common::{AppError, AppResult, IdGenerator, validate_id};
use circle_db::{
    entities::reaction::{self, Emoji, TargetType},
    repositories::{CommentRepository, PostRepository, ReactionRepository, ReactionTally},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::counter::CounterService;

const SAVE_ERROR: &str = "Save Reaction Error";

/// The record a reaction points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionTarget {
    Post(String),
    Comment(String),
}

impl ReactionTarget {
    /// Build a target from its stored discriminator and ID.
    #[must_use]
    pub fn new(target_type: TargetType, id: String) -> Self {
        match target_type {
            TargetType::Post => Self::Post(id),
            TargetType::Comment => Self::Comment(id),
        }
    }

    /// Stored discriminator.
    #[must_use]
    pub const fn target_type(&self) -> TargetType {
        match self {
            Self::Post(_) => TargetType::Post,
            Self::Comment(_) => TargetType::Comment,
        }
    }

    /// ID of the post or comment.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Post(id) | Self::Comment(id) => id,
        }
    }
}

/// Input for saving a reaction.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveReactionInput {
    pub target_type: TargetType,

    #[validate(custom(function = "validate_id"))]
    pub target_id: String,

    pub emoji: Emoji,
}

/// Reaction service for business logic.
#[derive(Clone)]
pub struct ReactionService {
    reaction_repo: ReactionRepository,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    counters: CounterService,
    id_gen: IdGenerator,
}

impl ReactionService {
    /// Create a new reaction service.
    #[must_use]
    pub const fn new(
        reaction_repo: ReactionRepository,
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        counters: CounterService,
    ) -> Self {
        Self {
            reaction_repo,
            post_repo,
            comment_repo,
            counters,
            id_gen: IdGenerator::new(),
        }
    }

    /// Toggle the caller's reaction on a post or comment.
    ///
    /// Reacting with the emoji already left removes the reaction; reacting
    /// with the other one switches it. Returns the target's new tally.
    pub async fn save(&self, caller_id: &str, input: SaveReactionInput) -> AppResult<ReactionTally> {
        input.validate()?;

        let target_id = IdGenerator::normalize(&input.target_id);
        let target = ReactionTarget::new(input.target_type, target_id);
        self.ensure_target_exists(&target).await?;

        let existing = self
            .reaction_repo
            .find_by_author_and_target(caller_id, target.target_type(), target.id())
            .await?;

        match existing {
            None => {
                let model = reaction::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    target_type: Set(target.target_type()),
                    target_id: Set(target.id().to_string()),
                    author_id: Set(caller_id.to_string()),
                    emoji: Set(input.emoji),
                    created_at: Set(chrono::Utc::now().into()),
                    ..Default::default()
                };
                self.reaction_repo.create(model).await?;
            }
            Some(reaction) if reaction.emoji == input.emoji => {
                self.reaction_repo.delete(reaction).await?;
            }
            Some(reaction) => {
                let mut active: reaction::ActiveModel = reaction.into();
                active.emoji = Set(input.emoji);
                active.updated_at = Set(Some(chrono::Utc::now().into()));
                self.reaction_repo.update(active).await?;
            }
        }

        self.counters.recompute_reactions(&target).await
    }

    async fn ensure_target_exists(&self, target: &ReactionTarget) -> AppResult<()> {
        match target {
            ReactionTarget::Post(id) => {
                if self.post_repo.find_active_by_id(id).await?.is_none() {
                    return Err(AppError::not_found("Post not found", SAVE_ERROR));
                }
            }
            ReactionTarget::Comment(id) => {
                if self.comment_repo.find_active_by_id(id).await?.is_none() {
                    return Err(AppError::not_found("Comment not found", SAVE_ERROR));
                }
            }
        }
        Ok(())
    }
}
