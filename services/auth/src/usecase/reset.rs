//! The password-recovery state machine: request → verify → confirm, plus
//! the periodic expiry sweep.

use chrono::{Duration, Utc};
use rand::RngExt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use jobspace_domain::principal::PrincipalKind;

use crate::domain::repository::{DeliveryGateway, PrincipalRepository, ResetCodeRepository};
use crate::domain::types::{
    DeliveryMethod, NewResetCode, Principal, RESET_CODE_LEN, RESET_CODE_TTL_SECS,
    VERIFICATION_TOKEN_BYTES,
};
use crate::error::AuthServiceError;
use crate::infra::password;

/// Digits only — codes are typed from a phone screen.
const CODE_CHARSET: &[u8] = b"0123456789";

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..RESET_CODE_LEN)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

fn generate_verification_token() -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..VERIFICATION_TOKEN_BYTES)
        .map(|_| rng.random_range(0..=u8::MAX))
        .collect();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Resolve the owning active principal for a channel value, students first.
/// A value valid for both tables resolves to the student row.
async fn resolve_by_channel<P: PrincipalRepository>(
    principals: &P,
    method: DeliveryMethod,
    channel_value: &str,
) -> Result<Option<Principal>, AuthServiceError> {
    for kind in PrincipalKind::ALL {
        let found = match method {
            DeliveryMethod::Email => principals.find_active_by_email(kind, channel_value).await?,
            DeliveryMethod::Sms => principals.find_active_by_phone(kind, channel_value).await?,
        };
        if found.is_some() {
            return Ok(found);
        }
    }
    Ok(None)
}

// ── RequestReset ─────────────────────────────────────────────────────────────

pub struct RequestResetInput {
    pub method: DeliveryMethod,
    pub channel_value: String,
}

#[derive(Debug)]
pub struct RequestResetOutput {
    /// Whether the gateway accepted the message. The code is live either way.
    pub delivered: bool,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

pub struct RequestResetUseCase<P, R, D>
where
    P: PrincipalRepository,
    R: ResetCodeRepository,
    D: DeliveryGateway,
{
    pub principals: P,
    pub reset_codes: R,
    pub delivery: D,
}

impl<P, R, D> RequestResetUseCase<P, R, D>
where
    P: PrincipalRepository,
    R: ResetCodeRepository,
    D: DeliveryGateway,
{
    pub async fn execute(
        &self,
        input: RequestResetInput,
    ) -> Result<RequestResetOutput, AuthServiceError> {
        let principal = resolve_by_channel(&self.principals, input.method, &input.channel_value)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        let now = Utc::now();
        let new = NewResetCode {
            code: generate_code(),
            email: (input.method == DeliveryMethod::Email).then(|| input.channel_value.clone()),
            phone: (input.method == DeliveryMethod::Sms).then(|| input.channel_value.clone()),
            method: input.method,
            principal_kind: principal.kind,
            expires_at: now + Duration::seconds(RESET_CODE_TTL_SECS),
        };

        // Invalidate-old + insert-new is one transaction inside the repo:
        // at most one live code per channel at any instant.
        let stored = self.reset_codes.replace_active(&new).await?;

        let delivered = match self
            .delivery
            .deliver_code(&input.channel_value, &principal.name, &stored.code, input.method)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                // The code stays valid; an operator can relay it from here.
                tracing::warn!(
                    error = %e,
                    method = %input.method,
                    code = %stored.code,
                    "reset code delivery failed, code held for out-of-band delivery"
                );
                false
            }
        };

        Ok(RequestResetOutput {
            delivered,
            expires_at: stored.expires_at,
        })
    }
}

// ── VerifyResetCode ──────────────────────────────────────────────────────────

pub struct VerifyResetCodeInput {
    pub code: String,
    pub method: DeliveryMethod,
    pub channel_value: String,
}

#[derive(Debug)]
pub struct VerifyResetCodeOutput {
    pub token: String,
    pub principal_kind: PrincipalKind,
}

pub struct VerifyResetCodeUseCase<P, R>
where
    P: PrincipalRepository,
    R: ResetCodeRepository,
{
    pub principals: P,
    pub reset_codes: R,
}

impl<P, R> VerifyResetCodeUseCase<P, R>
where
    P: PrincipalRepository,
    R: ResetCodeRepository,
{
    pub async fn execute(
        &self,
        input: VerifyResetCodeInput,
    ) -> Result<VerifyResetCodeOutput, AuthServiceError> {
        let principal = resolve_by_channel(&self.principals, input.method, &input.channel_value)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        let record = self
            .reset_codes
            .find_valid(&input.code, input.method, principal.kind, &input.channel_value)
            .await?
            .ok_or(AuthServiceError::InvalidOrExpired)?;

        // Conditional transition: only one concurrent verifier can flip
        // is_used and walk away with a token.
        let token = generate_verification_token();
        if !self.reset_codes.claim(record.id, &token).await? {
            return Err(AuthServiceError::InvalidOrExpired);
        }

        Ok(VerifyResetCodeOutput {
            token,
            principal_kind: principal.kind,
        })
    }
}

// ── ConfirmPassword ──────────────────────────────────────────────────────────

pub struct ConfirmPasswordInput {
    pub token: String,
    pub new_password: String,
}

pub struct ConfirmPasswordUseCase<P, R>
where
    P: PrincipalRepository,
    R: ResetCodeRepository,
{
    pub principals: P,
    pub reset_codes: R,
}

impl<P, R> ConfirmPasswordUseCase<P, R>
where
    P: PrincipalRepository,
    R: ResetCodeRepository,
{
    pub async fn execute(&self, input: ConfirmPasswordInput) -> Result<(), AuthServiceError> {
        password::check_policy(&input.new_password)?;

        // Tokens only exist on already-used rows; expiry is inherited from
        // the code's window.
        let record = self
            .reset_codes
            .find_by_token(&input.token)
            .await?
            .ok_or(AuthServiceError::InvalidToken)?;

        let channel_value = record
            .channel_value()
            .ok_or_else(|| AuthServiceError::Internal(anyhow::anyhow!("reset code has no channel value")))?;

        let principal = match record.method {
            DeliveryMethod::Email => {
                self.principals
                    .find_active_by_email(record.principal_kind, channel_value)
                    .await?
            }
            DeliveryMethod::Sms => {
                self.principals
                    .find_active_by_phone(record.principal_kind, channel_value)
                    .await?
            }
        }
        .ok_or(AuthServiceError::NotFound)?;

        let hash = password::hash_password(&input.new_password)?;

        // Hash swap + code deletion commit together; a replayed token finds
        // nothing.
        self.reset_codes
            .consume_and_set_password(record.id, record.principal_kind, principal.id, &hash)
            .await?;

        Ok(())
    }
}

// ── CleanupExpired ───────────────────────────────────────────────────────────

/// Deletes every reset code past expiry, used or not. Runs from the
/// background sweep, never on the request path.
pub struct CleanupExpiredUseCase<R: ResetCodeRepository> {
    pub reset_codes: R,
}

impl<R: ResetCodeRepository> CleanupExpiredUseCase<R> {
    pub async fn execute(&self) -> Result<u64, AuthServiceError> {
        self.reset_codes.delete_expired().await
    }
}
