#![allow(async_fn_in_trait)]

use jobspace_domain::principal::PrincipalKind;

use crate::domain::types::{DeliveryMethod, NewResetCode, Principal, ResetCode};
use crate::error::AuthServiceError;

/// Port onto the credential store (students + companies tables).
pub trait PrincipalRepository: Send + Sync {
    /// Find an active principal of the given kind by email.
    async fn find_active_by_email(
        &self,
        kind: PrincipalKind,
        email: &str,
    ) -> Result<Option<Principal>, AuthServiceError>;

    /// Find an active principal of the given kind by phone.
    async fn find_active_by_phone(
        &self,
        kind: PrincipalKind,
        phone: &str,
    ) -> Result<Option<Principal>, AuthServiceError>;

    /// Find by id regardless of liveness — callers check `is_active`
    /// themselves so a deactivated account is distinguishable from a
    /// deleted one at the log level.
    async fn find_by_id(
        &self,
        kind: PrincipalKind,
        id: i32,
    ) -> Result<Option<Principal>, AuthServiceError>;
}

/// Repository for password-reset codes.
pub trait ResetCodeRepository: Send + Sync {
    /// Invalidate every unused code for the new code's (channel, method,
    /// kind) tuple and insert the new one — a single transaction, so a crash
    /// can never leave two live codes for one channel.
    async fn replace_active(&self, new: &NewResetCode) -> Result<ResetCode, AuthServiceError>;

    /// Find a matching unused, unexpired code for the channel.
    async fn find_valid(
        &self,
        code: &str,
        method: DeliveryMethod,
        kind: PrincipalKind,
        channel_value: &str,
    ) -> Result<Option<ResetCode>, AuthServiceError>;

    /// The single state transition: mark the row used and attach the
    /// verification token, but only if it is still unused and unexpired.
    /// Returns whether this caller won; concurrent losers get `false`.
    async fn claim(&self, id: i32, verification_token: &str) -> Result<bool, AuthServiceError>;

    /// Find an already-used, unexpired code by verification token.
    async fn find_by_token(&self, token: &str) -> Result<Option<ResetCode>, AuthServiceError>;

    /// Set the principal's password hash and delete the reset row in one
    /// transaction; neither mutation is observable without the other.
    async fn consume_and_set_password(
        &self,
        code_id: i32,
        kind: PrincipalKind,
        principal_id: i32,
        password_hash: &str,
    ) -> Result<(), AuthServiceError>;

    /// Delete every row past its expiry, used or not. Returns the count.
    async fn delete_expired(&self) -> Result<u64, AuthServiceError>;
}

/// Port onto the out-of-band transport (mail API / SMS provider).
///
/// Failures here are soft: the stored code stays valid either way.
pub trait DeliveryGateway: Send + Sync {
    async fn deliver_code(
        &self,
        to: &str,
        recipient_name: &str,
        code: &str,
        method: DeliveryMethod,
    ) -> anyhow::Result<()>;
}
