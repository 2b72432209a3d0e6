use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use jobspace_core::health::{healthz, readyz};
use jobspace_core::middleware::request_id_layer;

use crate::handlers::reset::{confirm_new_password, request_reset, verify_reset_code};
use crate::handlers::session::{login_company, login_student, logout, me, refresh};
use crate::middleware::principal_required;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Sessions
        .route("/auth/login/student", post(login_student))
        .route("/auth/login/company", post(login_company))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
        .route(
            "/auth/me",
            get(me).route_layer(middleware::from_fn_with_state(
                state.clone(),
                principal_required,
            )),
        )
        // Password recovery
        .route("/auth/reset-password", post(request_reset))
        .route("/auth/verify-reset-code", post(verify_reset_code))
        .route("/auth/confirm-new-password", post(confirm_new_password))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
