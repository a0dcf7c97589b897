//! # messenger-service
//!
//! Application layer: identity resolution, membership, messages, reactions
//! and the per-viewer conversation views, plus the request/response DTOs.

pub mod dto;
pub mod notifier;
pub mod services;

pub use notifier::BroadcastNotifier;
pub use services::{
    ConversationService, IdentityResolver, MembershipService, MessageService, ReactionService,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, UserService,
};
