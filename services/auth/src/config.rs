use jobspace_auth_types::cookie::{DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS};

/// Auth service configuration loaded from environment variables.
///
/// The signing secret, TTLs, and cookie security flag are injected here and
/// nowhere else — there are no production fallbacks for secrets.
#[derive(Debug)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing JWT access and refresh tokens.
    pub jwt_secret: String,
    /// Access-token lifetime in seconds (default 1800). Env var: `ACCESS_TOKEN_TTL_SECS`.
    pub access_token_ttl_secs: u64,
    /// Refresh-token lifetime in seconds (default 604800). Env var: `REFRESH_TOKEN_TTL_SECS`.
    pub refresh_token_ttl_secs: u64,
    /// Set the `Secure` attribute on session cookies (default false; set true
    /// behind TLS). Env var: `COOKIE_SECURE`.
    pub cookie_secure: bool,
    /// TCP port to listen on (default 3110). Env var: `AUTH_PORT`.
    pub auth_port: u16,
    /// Mail API base URL (e.g. "https://mail.example.com"). Env var: `MAIL_API_URL`.
    pub mail_api_url: Option<String>,
    /// Mail API bearer token. Env var: `MAIL_API_TOKEN`.
    pub mail_api_token: Option<String>,
    /// Sender address for outgoing mail. Env var: `MAIL_FROM`.
    pub mail_from: Option<String>,
    /// SMS provider messages endpoint. Env var: `SMS_API_URL`.
    pub sms_api_url: Option<String>,
    /// SMS provider credentials. Env vars: `SMS_ACCOUNT_SID` / `SMS_AUTH_TOKEN`.
    pub sms_account_sid: Option<String>,
    pub sms_auth_token: Option<String>,
    /// Sender number for outgoing SMS. Env var: `SMS_FROM`.
    pub sms_from: Option<String>,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            access_token_ttl_secs: std::env::var("ACCESS_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_ACCESS_TTL_SECS),
            refresh_token_ttl_secs: std::env::var("REFRESH_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REFRESH_TTL_SECS),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            auth_port: std::env::var("AUTH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3110),
            mail_api_url: std::env::var("MAIL_API_URL").ok(),
            mail_api_token: std::env::var("MAIL_API_TOKEN").ok(),
            mail_from: std::env::var("MAIL_FROM").ok(),
            sms_api_url: std::env::var("SMS_API_URL").ok(),
            sms_account_sid: std::env::var("SMS_ACCOUNT_SID").ok(),
            sms_auth_token: std::env::var("SMS_AUTH_TOKEN").ok(),
            sms_from: std::env::var("SMS_FROM").ok(),
        }
    }
}
