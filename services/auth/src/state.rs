use std::sync::Arc;

use sea_orm::DatabaseConnection;

use jobspace_auth_types::cookie::CookiePolicy;
use jobspace_auth_types::token::TokenCodec;

use crate::infra::db::{DbPrincipalRepository, DbResetCodeRepository};
use crate::infra::delivery::HttpDeliveryGateway;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub tokens: Arc<TokenCodec>,
    pub cookies: CookiePolicy,
    pub delivery: HttpDeliveryGateway,
}

impl AppState {
    pub fn principal_repo(&self) -> DbPrincipalRepository {
        DbPrincipalRepository {
            db: self.db.clone(),
        }
    }

    pub fn reset_code_repo(&self) -> DbResetCodeRepository {
        DbResetCodeRepository {
            db: self.db.clone(),
        }
    }
}
