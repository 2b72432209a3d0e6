//! sea-orm entities for the auth service's tables.

pub mod companies;
pub mod reset_codes;
pub mod students;
