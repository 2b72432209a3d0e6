use std::sync::Arc;
use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use jobspace_auth::config::AuthConfig;
use jobspace_auth::infra::delivery::HttpDeliveryGateway;
use jobspace_auth::router::build_router;
use jobspace_auth::state::AppState;
use jobspace_auth::usecase::reset::CleanupExpiredUseCase;
use jobspace_auth_types::cookie::CookiePolicy;
use jobspace_auth_types::token::TokenCodec;

/// Interval between expired reset-code sweeps.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() {
    jobspace_core::tracing::init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let tokens = Arc::new(TokenCodec::new(
        config.jwt_secret.clone(),
        config.access_token_ttl_secs,
        config.refresh_token_ttl_secs,
    ));
    let delivery = HttpDeliveryGateway::from_config(&config);

    let state = AppState {
        db,
        tokens,
        cookies: CookiePolicy {
            secure: config.cookie_secure,
        },
        delivery,
    };

    // Sweep expired reset codes off the request path.
    let cleanup = CleanupExpiredUseCase {
        reset_codes: state.reset_code_repo(),
    };
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            ticker.tick().await;
            match cleanup.execute().await {
                Ok(0) => {}
                Ok(count) => info!(count, "deleted expired reset codes"),
                Err(e) => tracing::warn!(error = %e, "reset code cleanup failed"),
            }
        }
    });

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
