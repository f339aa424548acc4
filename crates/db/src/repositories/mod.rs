//! Repositories wrapping sea-orm queries per entity.

mod comment;
mod friend;
mod post;
mod reaction;
mod user;

pub use comment::CommentRepository;
pub use friend::FriendRepository;
pub use post::PostRepository;
pub use reaction::{ReactionRepository, ReactionTally};
pub use user::UserRepository;
