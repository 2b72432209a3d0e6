//! Request authorization: cookie → token → claims → liveness re-check.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;

use jobspace_auth_types::cookie::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, set_access_cookie};
use jobspace_auth_types::token::TokenCodec;
use jobspace_domain::principal::PrincipalKind;

use crate::domain::repository::PrincipalRepository;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::refresh::RefreshSessionUseCase;

/// Immutable principal context injected into request extensions by the
/// guards. Handlers read it through the extractor impl below.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal {
    pub id: i32,
    pub email: String,
    pub kind: PrincipalKind,
}

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AuthServiceError;

    // axum defines this as `fn -> impl Future + Send`; extracting
    // synchronously and returning a 'static async block sidesteps the
    // lifetime-capture mismatch an `async fn` would hit.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let principal = parts.extensions.get::<CurrentPrincipal>().cloned();
        async move { principal.ok_or(AuthServiceError::Unauthenticated) }
    }
}

/// The full guard sequence. Runs on every authorized request; nothing is
/// cached across requests, so deactivation takes effect immediately instead
/// of at token expiry.
pub async fn authorize<P: PrincipalRepository>(
    tokens: &TokenCodec,
    principals: &P,
    jar: &CookieJar,
    allowed: &[PrincipalKind],
) -> Result<CurrentPrincipal, AuthServiceError> {
    let token_value = jar
        .get(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_owned())
        .ok_or(AuthServiceError::Unauthenticated)?;

    let claims = tokens
        .verify_access(&token_value)
        .map_err(|_| AuthServiceError::Unauthenticated)?;

    if !allowed.contains(&claims.principal_type) {
        return Err(AuthServiceError::Forbidden);
    }

    // The token stays syntactically valid after deactivation; this re-fetch
    // is what revokes access.
    let principal = principals
        .find_by_id(claims.principal_type, claims.user_id)
        .await?
        .ok_or(AuthServiceError::AccountInvalid)?;
    if !principal.is_active {
        return Err(AuthServiceError::AccountInvalid);
    }

    Ok(CurrentPrincipal {
        id: principal.id,
        email: principal.email,
        kind: principal.kind,
    })
}

/// [`authorize`] with a refresh fallback: when the access token is missing
/// or stale but a valid refresh cookie is present, re-validate the principal
/// through the refresh flow and hand back a fresh access token for the
/// caller to set on the response.
pub async fn authorize_or_refresh<P: PrincipalRepository + Clone>(
    tokens: &Arc<TokenCodec>,
    principals: &P,
    jar: &CookieJar,
) -> Result<(CurrentPrincipal, Option<String>), AuthServiceError> {
    match authorize(tokens, principals, jar, &PrincipalKind::ALL).await {
        Ok(principal) => Ok((principal, None)),
        Err(AuthServiceError::Unauthenticated) => {
            let refresh_value = jar
                .get(REFRESH_TOKEN_COOKIE)
                .map(|c| c.value().to_owned())
                .ok_or(AuthServiceError::Unauthenticated)?;

            let usecase = RefreshSessionUseCase {
                principals: principals.clone(),
                tokens: tokens.clone(),
            };
            let out = usecase.execute(&refresh_value).await?;

            Ok((
                CurrentPrincipal {
                    id: out.principal.id,
                    email: out.principal.email,
                    kind: out.principal.kind,
                },
                Some(out.access_token),
            ))
        }
        Err(e) => Err(e),
    }
}

async fn guard(
    state: AppState,
    jar: CookieJar,
    mut req: Request,
    next: Next,
    allowed: &'static [PrincipalKind],
) -> Result<Response, AuthServiceError> {
    let principal = authorize(&state.tokens, &state.principal_repo(), &jar, allowed).await?;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Guard for student-only routes. Apply with
/// `middleware::from_fn_with_state(state, student_required)`.
pub async fn student_required(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, AuthServiceError> {
    guard(state, jar, req, next, &[PrincipalKind::Student]).await
}

/// Guard for company-only routes.
pub async fn company_required(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, AuthServiceError> {
    guard(state, jar, req, next, &[PrincipalKind::Company]).await
}

/// Guard for routes open to any authenticated principal.
pub async fn principal_required(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, AuthServiceError> {
    guard(state, jar, req, next, &PrincipalKind::ALL).await
}

/// Opt-in refresh-then-retry wrapper.
///
/// Where [`principal_required`] fails closed on an expired access token,
/// this variant falls back to the refresh cookie, runs the handler with the
/// refreshed identity, and sets the new access cookie on the way out.
/// Compose it per route; it is never applied implicitly.
pub async fn refresh_retry(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthServiceError> {
    let (principal, minted) =
        authorize_or_refresh(&state.tokens, &state.principal_repo(), &jar).await?;
    req.extensions_mut().insert(principal);
    let response = next.run(req).await;

    match minted {
        Some(access_token) => {
            let jar = set_access_cookie(
                CookieJar::new(),
                access_token,
                state.tokens.access_ttl_secs(),
                state.cookies,
            );
            Ok((jar, response).into_response())
        }
        None => Ok(response),
    }
}
