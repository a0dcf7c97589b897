//! Database models - SQLx-compatible structs for PostgreSQL tables

mod chat;
mod member;
mod message;
mod reaction;
mod user;

pub use chat::ChatModel;
pub use member::{ChatMemberModel, ChatWithMemberModel, MemberWithUserModel};
pub use message::{AttachmentModel, MessageModel, UnreadCountModel};
pub use reaction::ReactionModel;
pub use user::UserModel;
