//! Domain events published to the event notifier

mod domain_event;

pub use domain_event::{
    ChatCreatedEvent, DomainEvent, EventEnvelope, MessageAppendedEvent, ReactionToggledEvent,
};
