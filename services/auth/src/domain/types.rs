use chrono::{DateTime, Utc};

use jobspace_domain::principal::PrincipalKind;

/// Account data the auth subsystem needs: identity, channels, credential
/// hash, liveness. Owned by the credential store; mutated here only through
/// the password-set operation.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub kind: PrincipalKind,
    pub is_active: bool,
}

/// Out-of-band channel a reset code travels over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMethod {
    Email,
    Sms,
}

impl DeliveryMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "email" => Some(Self::Email),
            "sms" => Some(Self::Sms),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One in-flight password-recovery attempt.
///
/// State machine: created (`is_used = false`) → used (exactly once, token
/// attached) → deleted when the token is redeemed. Rows that are never
/// verified sit until the cleanup sweep deletes them past `expires_at`.
#[derive(Debug, Clone)]
pub struct ResetCode {
    pub id: i32,
    pub code: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub method: DeliveryMethod,
    pub principal_kind: PrincipalKind,
    pub is_used: bool,
    pub verification_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ResetCode {
    /// The channel value this code was requested for.
    pub fn channel_value(&self) -> Option<&str> {
        match self.method {
            DeliveryMethod::Email => self.email.as_deref(),
            DeliveryMethod::Sms => self.phone.as_deref(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// A code can still win the verify transition.
    pub fn is_verifiable(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && !self.is_expired(now)
    }
}

/// Insert payload for a fresh reset code; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewResetCode {
    pub code: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub method: DeliveryMethod,
    pub principal_kind: PrincipalKind,
    pub expires_at: DateTime<Utc>,
}

/// Reset code length in digits.
pub const RESET_CODE_LEN: usize = 6;

/// Reset code time-to-live in seconds (15 minutes).
pub const RESET_CODE_TTL_SECS: i64 = 900;

/// Verification token entropy in bytes (256 bits).
pub const VERIFICATION_TOKEN_BYTES: usize = 32;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;
