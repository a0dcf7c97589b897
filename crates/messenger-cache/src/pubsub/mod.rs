//! Redis Pub/Sub module.

mod channels;
mod publisher;

pub use channels::{PubSubChannel, CHAT_CHANNEL_PREFIX, USER_CHANNEL_PREFIX};
pub use publisher::Publisher;
