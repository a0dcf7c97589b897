//! Principal verification and identity provider clients

mod jwt;
mod provider;

pub use jwt::{Claims, JwtService};
pub use provider::{ClaimsIdentityProvider, HttpIdentityProvider};
