//! Domain errors - error types for the domain layer

use thiserror::Error;

use super::ErrorKind;
use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Identity
    // =========================================================================
    #[error("No verified principal")]
    MissingPrincipal,

    #[error("Unknown principal: {0}")]
    UnknownPrincipal(String),

    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Chat not found: {0}")]
    ChatNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Member not found in chat")]
    MemberNotFound,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not a member of chat {0}")]
    NotChatMember(Snowflake),

    #[error("Chat role does not allow this action")]
    InsufficientChatRole,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Message needs text or at least one attachment")]
    EmptyMessage,

    #[error("Counterpart user does not exist")]
    CounterpartNotFound,

    #[error("Member user does not exist: {0}")]
    UnknownMember(Snowflake),

    #[error("Reply target is not a message of this chat")]
    InvalidReplyTarget,

    #[error("Members can only be added to group chats")]
    NotAGroupChat,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Already a member of this chat")]
    AlreadyMember,

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage call timed out")]
    Timeout,

    #[error("Identity provider unavailable: {0}")]
    IdentityProviderUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingPrincipal | Self::UnknownPrincipal(_) => ErrorKind::Unauthenticated,

            Self::UserNotFound(_)
            | Self::ChatNotFound(_)
            | Self::MessageNotFound(_)
            | Self::MemberNotFound => ErrorKind::NotFound,

            Self::NotChatMember(_) | Self::InsufficientChatRole => ErrorKind::PermissionDenied,

            Self::ValidationError(_)
            | Self::MissingField(_)
            | Self::EmptyMessage
            | Self::CounterpartNotFound
            | Self::UnknownMember(_)
            | Self::InvalidReplyTarget
            | Self::NotAGroupChat => ErrorKind::InvalidArgument,

            Self::AlreadyMember | Self::UniqueViolation(_) => ErrorKind::Conflict,

            Self::StorageUnavailable(_) | Self::Timeout | Self::IdentityProviderUnavailable(_) => {
                ErrorKind::Transient
            }

            Self::DatabaseError(_) | Self::CacheError(_) | Self::InternalError(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingPrincipal => "UNAUTHENTICATED",
            Self::UnknownPrincipal(_) => "UNKNOWN_PRINCIPAL",

            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::ChatNotFound(_) => "UNKNOWN_CHAT",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::MemberNotFound => "UNKNOWN_MEMBER",

            Self::NotChatMember(_) => "NOT_CHAT_MEMBER",
            Self::InsufficientChatRole => "INSUFFICIENT_CHAT_ROLE",

            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::EmptyMessage => "EMPTY_MESSAGE",
            Self::CounterpartNotFound => "UNKNOWN_COUNTERPART",
            Self::UnknownMember(_) => "UNKNOWN_MEMBER_USER",
            Self::InvalidReplyTarget => "INVALID_REPLY_TARGET",
            Self::NotAGroupChat => "NOT_A_GROUP_CHAT",

            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::UniqueViolation(_) => "CONFLICT",

            Self::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            Self::Timeout => "TIMEOUT",
            Self::IdentityProviderUnavailable(_) => "IDENTITY_PROVIDER_UNAVAILABLE",

            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }

    pub fn is_authorization(&self) -> bool {
        self.kind() == ErrorKind::PermissionDenied
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    pub fn is_transient(&self) -> bool {
        self.kind().is_retryable()
    }
}
