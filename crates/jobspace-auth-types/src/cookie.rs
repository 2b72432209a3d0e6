//! Cookie builders for the access/refresh token pair.
//!
//! Both cookies are `HttpOnly`, `SameSite=Lax`, `Path=/`. The `Secure` flag
//! is environment policy, not a constant — plaintext localhost in dev, TLS
//! in production.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Cookie name for the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Default access-token lifetime in seconds (30 minutes).
pub const DEFAULT_ACCESS_TTL_SECS: u64 = 1800;

/// Default refresh-token lifetime in seconds (7 days).
pub const DEFAULT_REFRESH_TTL_SECS: u64 = 604800;

/// Environment-controlled cookie attributes.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    /// Set the `Secure` attribute (require HTTPS transport).
    pub secure: bool,
}

fn session_cookie(
    name: &'static str,
    value: String,
    max_age_secs: i64,
    policy: CookiePolicy,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .http_only(true)
        .secure(policy.secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Set the access-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use jobspace_auth_types::cookie::{set_access_cookie, CookiePolicy, ACCESS_TOKEN_COOKIE};
///
/// let jar = CookieJar::new();
/// let jar = set_access_cookie(jar, "token_value".to_string(), 1800, CookiePolicy { secure: true });
/// let cookie = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(1800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_access_cookie(
    jar: CookieJar,
    value: String,
    max_age_secs: u64,
    policy: CookiePolicy,
) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        value,
        max_age_secs as i64,
        policy,
    ))
}

/// Set the refresh-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use jobspace_auth_types::cookie::{set_refresh_cookie, CookiePolicy, REFRESH_TOKEN_COOKIE};
///
/// let jar = CookieJar::new();
/// let jar = set_refresh_cookie(jar, "refresh_value".to_string(), 604800, CookiePolicy { secure: false });
/// let cookie = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(!cookie.secure().unwrap_or(false));
/// ```
pub fn set_refresh_cookie(
    jar: CookieJar,
    value: String,
    max_age_secs: u64,
    policy: CookiePolicy,
) -> CookieJar {
    jar.add(session_cookie(
        REFRESH_TOKEN_COOKIE,
        value,
        max_age_secs as i64,
        policy,
    ))
}

/// Clear both token cookies by setting Max-Age to 0. Idempotent — clearing
/// an already-clean jar is fine.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use jobspace_auth_types::cookie::{
///     clear_session_cookies, set_access_cookie, set_refresh_cookie,
///     CookiePolicy, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
/// };
///
/// let policy = CookiePolicy { secure: true };
/// let jar = CookieJar::new();
/// let jar = set_access_cookie(jar, "a".to_string(), 1800, policy);
/// let jar = set_refresh_cookie(jar, "r".to_string(), 604800, policy);
/// let jar = clear_session_cookies(jar, policy);
/// assert_eq!(jar.get(ACCESS_TOKEN_COOKIE).unwrap().max_age(), Some(time::Duration::ZERO));
/// assert_eq!(jar.get(REFRESH_TOKEN_COOKIE).unwrap().max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_session_cookies(jar: CookieJar, policy: CookiePolicy) -> CookieJar {
    let access = session_cookie(ACCESS_TOKEN_COOKIE, String::new(), 0, policy);
    let refresh = session_cookie(REFRESH_TOKEN_COOKIE, String::new(), 0, policy);
    jar.add(access).add(refresh)
}
