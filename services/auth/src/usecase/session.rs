use std::sync::Arc;

use jobspace_auth_types::token::TokenCodec;
use jobspace_domain::principal::PrincipalKind;

use crate::domain::repository::PrincipalRepository;
use crate::domain::types::Principal;
use crate::error::AuthServiceError;
use crate::infra::password;

pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub kind: PrincipalKind,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub principal: Principal,
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
}

/// Authenticate a principal by email + password and mint the session pair.
pub struct LoginUseCase<P: PrincipalRepository> {
    pub principals: P,
    pub tokens: Arc<TokenCodec>,
}

impl<P: PrincipalRepository> LoginUseCase<P> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, AuthServiceError> {
        // Inactive accounts are indistinguishable from unknown emails.
        let principal = self
            .principals
            .find_active_by_email(input.kind, &input.email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        if !password::verify_password(&input.password, &principal.password_hash)? {
            return Err(AuthServiceError::InvalidCredentials);
        }

        let (access_token, access_token_exp) = self
            .tokens
            .issue_access(principal.id, &principal.email, principal.kind)
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        let refresh_token = self
            .tokens
            .issue_refresh(principal.id, &principal.email, principal.kind)
            .map_err(|e| AuthServiceError::Internal(e.into()))?;

        Ok(LoginOutput {
            principal,
            access_token,
            access_token_exp,
            refresh_token,
        })
    }
}
