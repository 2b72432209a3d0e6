use std::sync::Arc;

use jobspace_auth_types::token::TokenCodec;

use crate::domain::repository::PrincipalRepository;
use crate::domain::types::Principal;
use crate::error::AuthServiceError;

#[derive(Debug)]
pub struct RefreshOutput {
    pub principal: Principal,
    pub access_token: String,
    pub access_token_exp: u64,
}

/// Exchange a valid refresh token for a fresh access token.
///
/// The refresh token is not rotated — it keeps its original expiry. Token
/// format/signature/expiry problems surface as `Unauthenticated`; a
/// principal that vanished or was deactivated since issuance surfaces as
/// `AccountInvalid`, telling the client that re-login (not retry) is needed.
pub struct RefreshSessionUseCase<P: PrincipalRepository> {
    pub principals: P,
    pub tokens: Arc<TokenCodec>,
}

impl<P: PrincipalRepository> RefreshSessionUseCase<P> {
    pub async fn execute(&self, refresh_token: &str) -> Result<RefreshOutput, AuthServiceError> {
        let claims = self
            .tokens
            .verify_refresh(refresh_token)
            .map_err(|_| AuthServiceError::Unauthenticated)?;

        let principal = self
            .principals
            .find_by_id(claims.principal_type, claims.user_id)
            .await?
            .ok_or(AuthServiceError::AccountInvalid)?;
        if !principal.is_active {
            return Err(AuthServiceError::AccountInvalid);
        }

        let (access_token, access_token_exp) = self
            .tokens
            .issue_access(principal.id, &principal.email, principal.kind)
            .map_err(|e| AuthServiceError::Internal(e.into()))?;

        Ok(RefreshOutput {
            principal,
            access_token,
            access_token_exp,
        })
    }
}
