//! Session-token types for the Jobspace auth subsystem.
//!
//! Provides the token codec (issue + verify, HS256) and the cookie builders
//! that carry the access/refresh pair. Token issuance is feature-gated so
//! only the auth service can mint; validation is open to every consumer.

pub mod cookie;
pub mod token;
