//! Integration test utilities for the messenger server
//!
//! Spins up the full REST stack on the in-memory backend and drives it
//! over real HTTP.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
