//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    AddMemberRequest, AttachmentRequest, CreateDirectChatRequest, CreateGroupChatRequest,
    DirectoryQuery, ListMessagesQuery, SendMessageRequest, ToggleReactionRequest,
};

pub use responses::{
    AttachmentResponse, ChatDetailResponse, ChatSummaryResponse, HealthChecks, HealthResponse,
    LastMessageResponse, MemberResponse, MessageResponse, PeerResponse, ReactionResponse,
    ReadinessResponse, ReplyPreviewResponse, ToggleReactionResponse, UserResponse,
    UserSummaryResponse, UsersResponse, SAVED_MESSAGES_NAME,
};

pub use mappers::{ChatWithMembers, MessageWithDetails, ReplyPreview};
