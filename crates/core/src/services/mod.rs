//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod counter;
pub mod friend;
pub mod post;
pub mod reaction;
pub mod token;
pub mod user;

pub use comment::{CommentService, CommentView, CreateCommentInput, UpdateCommentInput};
pub use counter::CounterService;
pub use friend::{
    FriendService, ReactRequestInput, RequestDecision, SendPlan, SendRequestInput,
    plan_send_request,
};
pub use post::{CreatePostInput, PostDetail, PostService, PostView, UpdatePostInput};
pub use reaction::{ReactionService, ReactionTarget, SaveReactionInput};
pub use token::{Claims, TokenService};
pub use user::{
    AuthSession, LoginInput, RegisterInput, UpdateProfileInput, UserService, UserWithFriendship,
};
