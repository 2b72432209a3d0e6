use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use jobspace_auth_types::cookie::{
    REFRESH_TOKEN_COOKIE, clear_session_cookies, set_access_cookie, set_refresh_cookie,
};
use jobspace_domain::principal::PrincipalKind;

use crate::domain::types::Principal;
use crate::error::AuthServiceError;
use crate::middleware::CurrentPrincipal;
use crate::state::AppState;
use crate::usecase::refresh::RefreshSessionUseCase;
use crate::usecase::session::{LoginInput, LoginUseCase};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct PrincipalBody {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: PrincipalKind,
}

impl From<&Principal> for PrincipalBody {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            email: p.email.clone(),
            kind: p.kind,
        }
    }
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub message: &'static str,
    pub user: PrincipalBody,
}

// ── POST /auth/login/{student,company} ────────────────────────────────────────

pub async fn login_student(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    login(state, jar, body, PrincipalKind::Student).await
}

pub async fn login_company(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    login(state, jar, body, PrincipalKind::Company).await
}

async fn login(
    state: AppState,
    jar: CookieJar,
    body: LoginRequest,
    kind: PrincipalKind,
) -> Result<(CookieJar, Json<SessionResponse>), AuthServiceError> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(AuthServiceError::InvalidInput(
            "email and password are required".to_owned(),
        ));
    }

    let usecase = LoginUseCase {
        principals: state.principal_repo(),
        tokens: state.tokens.clone(),
    };
    let out = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
            kind,
        })
        .await?;

    let jar = set_access_cookie(
        jar,
        out.access_token,
        state.tokens.access_ttl_secs(),
        state.cookies,
    );
    let jar = set_refresh_cookie(
        jar,
        out.refresh_token,
        state.tokens.refresh_ttl_secs(),
        state.cookies,
    );

    Ok((
        jar,
        Json(SessionResponse {
            message: "login successful",
            user: PrincipalBody::from(&out.principal),
        }),
    ))
}

// ── POST /auth/logout ─────────────────────────────────────────────────────────

/// Clears both session cookies. Idempotent — an already-logged-out client
/// gets the same answer.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = clear_session_cookies(jar, state.cookies);
    (jar, Json(serde_json::json!({ "message": "logout successful" })))
}

// ── POST /auth/refresh ────────────────────────────────────────────────────────

pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthServiceError> {
    let refresh_value = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_owned())
        .ok_or(AuthServiceError::Unauthenticated)?;

    let usecase = RefreshSessionUseCase {
        principals: state.principal_repo(),
        tokens: state.tokens.clone(),
    };
    let out = usecase.execute(&refresh_value).await?;

    let jar = set_access_cookie(
        jar,
        out.access_token,
        state.tokens.access_ttl_secs(),
        state.cookies,
    );

    Ok((
        jar,
        Json(SessionResponse {
            message: "token refreshed",
            user: PrincipalBody::from(&out.principal),
        }),
    ))
}

// ── GET /auth/me ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MeResponse {
    pub user: MeBody,
}

#[derive(Serialize)]
pub struct MeBody {
    pub id: i32,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: PrincipalKind,
}

/// Echo of the guard-injected principal context.
pub async fn me(principal: CurrentPrincipal) -> Json<MeResponse> {
    Json(MeResponse {
        user: MeBody {
            id: principal.id,
            email: principal.email,
            kind: principal.kind,
        },
    })
}
