//! Domain types shared across the Jobspace services.
//!
//! This crate contains only pure types with no framework dependencies.

pub mod principal;
