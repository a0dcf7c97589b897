//! Ports - storage repositories and external collaborators

mod ports;
mod repositories;

pub use ports::{EventNotifier, IdentityProvider};
pub use repositories::{
    ChatRepository, MessageQuery, MessageRepository, ReactionRepository, RepoResult,
    UserRepository, MAX_MESSAGE_PAGE,
};
