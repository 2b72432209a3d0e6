//! Cross-cutting service plumbing: tracing setup, request ids, health
//! endpoints, and shared serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
