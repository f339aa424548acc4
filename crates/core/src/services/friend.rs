//! Friend service: the friend-request state machine.
//!
//! An unordered pair of users has at most one edge. Lookups that decide
//! whether an edge exists ignore direction; who may act on an edge depends
//! on it.

use circle_common::{AppError, AppResult, IdGenerator, NameFilter, Page, Pagination, validate_id};
use circle_db::{
    entities::friend::{self, FriendStatus},
    repositories::{FriendRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::{
    counter::CounterService,
    user::{UserWithFriendship, with_friendships},
};

const SEND_ERROR: &str = "Send Friend Request Error";
const ADD_ERROR: &str = "Add Friend Error";

/// Input for sending a friend request.
#[derive(Debug, Deserialize, Validate)]
pub struct SendRequestInput {
    #[validate(custom(function = "validate_id"))]
    pub to: String,
}

/// Answer to a received friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestDecision {
    Accepted,
    Declined,
}

impl From<RequestDecision> for FriendStatus {
    fn from(decision: RequestDecision) -> Self {
        match decision {
            RequestDecision::Accepted => Self::Accepted,
            RequestDecision::Declined => Self::Declined,
        }
    }
}

/// Input for answering a friend request.
#[derive(Debug, Deserialize)]
pub struct ReactRequestInput {
    pub status: RequestDecision,
}

/// What sending a request does to the pair's edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendPlan {
    /// No edge yet: insert a pending one.
    Create,
    /// A declined edge: turn it back into a pending request from the caller.
    Reopen(friend::Model),
}

/// Decide how a request from `caller_id` applies to the pair's existing edge.
pub fn plan_send_request(existing: Option<friend::Model>, caller_id: &str) -> AppResult<SendPlan> {
    let Some(edge) = existing else {
        return Ok(SendPlan::Create);
    };

    match edge.status {
        FriendStatus::Pending if edge.from_id == caller_id => Err(AppError::invalid_state(
            "You have already sent a request to this user",
            ADD_ERROR,
        )),
        FriendStatus::Pending => Err(AppError::invalid_state(
            "You have already received a request from this user",
            ADD_ERROR,
        )),
        FriendStatus::Accepted => Err(AppError::invalid_state(
            "Users are already friends",
            ADD_ERROR,
        )),
        FriendStatus::Declined => Ok(SendPlan::Reopen(edge)),
    }
}

/// Friend service for business logic.
#[derive(Clone)]
pub struct FriendService {
    friend_repo: FriendRepository,
    user_repo: UserRepository,
    counters: CounterService,
    id_gen: IdGenerator,
}

impl FriendService {
    /// Create a new friend service.
    #[must_use]
    pub const fn new(
        friend_repo: FriendRepository,
        user_repo: UserRepository,
        counters: CounterService,
    ) -> Self {
        Self {
            friend_repo,
            user_repo,
            counters,
            id_gen: IdGenerator::new(),
        }
    }

    /// Send a friend request from `caller_id`.
    pub async fn send_request(
        &self,
        caller_id: &str,
        input: SendRequestInput,
    ) -> AppResult<friend::Model> {
        input.validate()?;
        let to_id = IdGenerator::normalize(&input.to);
        let to_id = to_id.as_str();

        if caller_id == to_id {
            return Err(AppError::bad_request(
                "Cannot send friend request to yourself",
                SEND_ERROR,
            ));
        }

        if self.user_repo.find_active_by_id(to_id).await?.is_none() {
            return Err(AppError::not_found("User not found", SEND_ERROR));
        }

        let existing = self.friend_repo.find_between(caller_id, to_id).await?;

        let edge = match plan_send_request(existing, caller_id)? {
            SendPlan::Create => {
                let model = friend::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    from_id: Set(caller_id.to_string()),
                    to_id: Set(to_id.to_string()),
                    status: Set(FriendStatus::Pending),
                    created_at: Set(chrono::Utc::now().into()),
                    ..Default::default()
                };
                self.friend_repo.create(model).await?
            }
            SendPlan::Reopen(edge) => {
                let mut active: friend::ActiveModel = edge.into();
                active.from_id = Set(caller_id.to_string());
                active.to_id = Set(to_id.to_string());
                active.status = Set(FriendStatus::Pending);
                active.updated_at = Set(Some(chrono::Utc::now().into()));
                self.friend_repo.update(active).await?
            }
        };

        tracing::debug!(from = %caller_id, to = %to_id, "Friend request sent");
        Ok(edge)
    }

    /// Accept or decline the pending request `from_id` sent to `caller_id`.
    pub async fn react_request(
        &self,
        caller_id: &str,
        from_id: &str,
        input: ReactRequestInput,
    ) -> AppResult<friend::Model> {
        let edge = self
            .friend_repo
            .find_directed(from_id, caller_id, FriendStatus::Pending)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Friend request not found", "React Friend Request Error")
            })?;

        let status = FriendStatus::from(input.status);
        let mut active: friend::ActiveModel = edge.into();
        active.status = Set(status);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        let edge = self.friend_repo.update(active).await?;

        if status == FriendStatus::Accepted {
            self.counters.recompute_friend_count(caller_id).await?;
            self.counters.recompute_friend_count(from_id).await?;
        }

        Ok(edge)
    }

    /// Withdraw a pending request `caller_id` sent to `to_id`.
    pub async fn cancel_request(&self, caller_id: &str, to_id: &str) -> AppResult<friend::Model> {
        let edge = self
            .friend_repo
            .find_directed(caller_id, to_id, FriendStatus::Pending)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Friend request not found", "Cancel Friend Request Error")
            })?;

        self.friend_repo.delete(edge.clone()).await?;
        Ok(edge)
    }

    /// End an accepted friendship, whichever side created it.
    pub async fn remove_friend(&self, caller_id: &str, other_id: &str) -> AppResult<friend::Model> {
        let edge = self
            .friend_repo
            .find_accepted_between(caller_id, other_id)
            .await?
            .ok_or_else(|| AppError::not_found("Friend not found", "Remove Friend Error"))?;

        self.friend_repo.delete(edge.clone()).await?;

        self.counters.recompute_friend_count(caller_id).await?;
        self.counters.recompute_friend_count(other_id).await?;

        Ok(edge)
    }

    /// Users who sent the caller a pending request.
    pub async fn list_incoming(
        &self,
        caller_id: &str,
        name: Option<&NameFilter>,
        pagination: Pagination,
    ) -> AppResult<Page<UserWithFriendship>> {
        let edges = self.friend_repo.find_incoming_pending(caller_id).await?;
        self.list_counterparts(caller_id, &edges, name, pagination)
            .await
    }

    /// Users the caller sent a pending request to.
    pub async fn list_outgoing(
        &self,
        caller_id: &str,
        name: Option<&NameFilter>,
        pagination: Pagination,
    ) -> AppResult<Page<UserWithFriendship>> {
        let edges = self.friend_repo.find_outgoing_pending(caller_id).await?;
        self.list_counterparts(caller_id, &edges, name, pagination)
            .await
    }

    /// The caller's friends.
    pub async fn list_friends(
        &self,
        caller_id: &str,
        name: Option<&NameFilter>,
        pagination: Pagination,
    ) -> AppResult<Page<UserWithFriendship>> {
        let edges = self.friend_repo.find_accepted(caller_id).await?;
        self.list_counterparts(caller_id, &edges, name, pagination)
            .await
    }

    async fn list_counterparts(
        &self,
        caller_id: &str,
        edges: &[friend::Model],
        name: Option<&NameFilter>,
        pagination: Pagination,
    ) -> AppResult<Page<UserWithFriendship>> {
        let ids: Vec<String> = edges
            .iter()
            .map(|e| e.other_party(caller_id).to_string())
            .collect();

        let (users, count) = self
            .user_repo
            .search(Some(ids.as_slice()), name, pagination)
            .await?;

        Ok(pagination.page_of(with_friendships(caller_id, users, edges), count))
    }
}
