//! Principal domain types.

use serde::{Deserialize, Serialize};

/// The two kinds of account that can authenticate against the job board.
///
/// Wire format: `"student"` / `"company"` — carried in token claims, the
/// `reset_codes.principal_kind` column, and client-facing `user_type` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    Student,
    Company,
}

impl PrincipalKind {
    /// All kinds, in lookup order. Channel resolution checks students first.
    pub const ALL: [PrincipalKind; 2] = [PrincipalKind::Student, PrincipalKind::Company];

    /// Wire value, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Company => "company",
        }
    }

    /// Parse a wire value. Returns `None` for unknown strings.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Self::Student),
            "company" => Some(Self::Company),
            _ => None,
        }
    }
}

impl std::fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
