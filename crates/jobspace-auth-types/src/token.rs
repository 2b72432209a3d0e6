//! Signed session tokens: claims, codec, validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use jsonwebtoken::{EncodingKey, Header, encode};
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use serde::Serialize;
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use std::time::{SystemTime, UNIX_EPOCH};

use jobspace_domain::principal::PrincipalKind;

/// Discriminates the two token flavors. A refresh token presented where an
/// access token is expected (or vice versa) is rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims payload shared by token creation (auth service) and validation.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | `"<type>:<id>"`, e.g. `"student:42"` |
/// | `user_id` | custom | principal id |
/// | `email` | custom | principal email at issuance |
/// | `principal_type` | `type` | `"student"` / `"company"` |
/// | `kind` | `kind` | `"access"` / `"refresh"` |
/// | `iat` / `exp` | `iat` / `exp` | seconds since epoch |
///
/// # Feature gate
///
/// [`Deserialize`] is always available — all consumers validate tokens.
/// [`Serialize`] requires the **`USE_ONLY_IN_AUTH_SERVICE`** cargo feature.
/// Only the auth service enables it because it is the sole token issuer.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct SessionClaims {
    pub sub: String,
    pub user_id: i32,
    pub email: String,
    #[serde(rename = "type")]
    pub principal_type: PrincipalKind,
    pub kind: TokenKind,
    pub iat: u64,
    pub exp: u64,
}

/// Errors returned by token verification.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("wrong token kind")]
    WrongKind,
}

#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

/// Stateless codec for the access/refresh token pair.
///
/// Holds the signing secret and both TTLs, injected at construction — there
/// is no ambient configuration, so tests can run with distinct secrets.
/// Immutable for the process lifetime.
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

impl TokenCodec {
    pub fn new(secret: impl Into<String>, access_ttl_secs: u64, refresh_ttl_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    pub fn access_ttl_secs(&self) -> u64 {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> u64 {
        self.refresh_ttl_secs
    }

    /// Decode and validate a JWT, returning raw claims.
    ///
    /// Validation: HS256, exp checked, required claims: `exp` + `sub`.
    /// Default leeway = 60s bounds clock skew between token issuer and
    /// validator.
    fn decode_jwt(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;
        validation.required_spec_claims.clear();
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;

        Ok(data.claims)
    }

    /// Validate an access-token cookie value. Every guarded request goes
    /// through here; the caller still re-checks principal liveness.
    pub fn verify_access(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let claims = self.decode_jwt(token)?;
        if claims.kind != TokenKind::Access {
            return Err(TokenError::WrongKind);
        }
        Ok(claims)
    }

    /// Validate a refresh-token cookie value for the refresh flow.
    pub fn verify_refresh(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let claims = self.decode_jwt(token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(TokenError::WrongKind);
        }
        Ok(claims)
    }
}

// ── Feature-gated: auth service only ─────────────────────────────────────

#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
impl TokenCodec {
    fn issue(
        &self,
        kind: TokenKind,
        id: i32,
        email: &str,
        principal_type: PrincipalKind,
        ttl_secs: u64,
    ) -> Result<(String, u64), jsonwebtoken::errors::Error> {
        let iat = now_secs();
        let exp = iat + ttl_secs;
        let claims = SessionClaims {
            sub: format!("{principal_type}:{id}"),
            user_id: id,
            email: email.to_owned(),
            principal_type,
            kind,
            iat,
            exp,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok((token, exp))
    }

    /// Mint an access token. Returns the token and its expiry timestamp.
    pub fn issue_access(
        &self,
        id: i32,
        email: &str,
        principal_type: PrincipalKind,
    ) -> Result<(String, u64), jsonwebtoken::errors::Error> {
        self.issue(TokenKind::Access, id, email, principal_type, self.access_ttl_secs)
    }

    /// Mint a refresh token.
    pub fn issue_refresh(
        &self,
        id: i32,
        email: &str,
        principal_type: PrincipalKind,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(TokenKind::Refresh, id, email, principal_type, self.refresh_ttl_secs)
            .map(|(token, _)| token)
    }
}
