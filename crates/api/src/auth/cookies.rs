//! Session state on the wire: two cookies.
//!
//! - the token cookie (name configurable) carries the raw token. `HttpOnly`
//!   keeps it out of scripts.
//! - [`ROTATION_HINT_COOKIE`] carries the Unix time (seconds) at which the
//!   client should call the rotate endpoint. Scripts may read it.
//!
//! Both are `SameSite=Strict`, `Path=/`, and live as long as the session's
//! absolute lifetime. Clearing always emits removal cookies, whether or not
//! the request carried them.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use turnstile_core::token::SessionToken;
use turnstile_core::types::Timestamp;

use super::session::SessionConfig;

/// Name of the script-readable next-rotation cookie.
pub const ROTATION_HINT_COOKIE: &str = "session_expiry";

const COOKIE_PATH: &str = "/";

/// Raw token from the request's token cookie, if present and non-empty.
pub fn session_token(jar: &CookieJar, config: &SessionConfig) -> Option<String> {
    jar.get(&config.cookie_name)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

/// Add the token and rotation-hint cookies for a freshly issued token.
pub fn set_session_cookies(
    jar: CookieJar,
    config: &SessionConfig,
    token: &SessionToken,
    next_rotation: Timestamp,
) -> CookieJar {
    let max_age = time::Duration::seconds(config.policy.cookie_max_age_secs());

    let token_cookie = Cookie::build((config.cookie_name.clone(), token.as_str().to_owned()))
        .path(COOKIE_PATH)
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(max_age);

    let hint_cookie = Cookie::build((ROTATION_HINT_COOKIE, next_rotation.timestamp().to_string()))
        .path(COOKIE_PATH)
        .http_only(false)
        .secure(config.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(max_age);

    jar.add(token_cookie).add(hint_cookie)
}

/// Instruct the client to drop both session cookies.
pub fn clear_session_cookies(jar: CookieJar, config: &SessionConfig) -> CookieJar {
    jar.add(removal(config.cookie_name.clone(), true, config.cookie_secure))
        .add(removal(ROTATION_HINT_COOKIE.to_owned(), false, config.cookie_secure))
}

fn removal(name: String, http_only: bool, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, ""))
        .path(COOKIE_PATH)
        .http_only(http_only)
        .secure(secure)
        .same_site(SameSite::Strict)
        .build();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use axum::http::header::SET_COOKIE;
    use axum::response::IntoResponse;
    use chrono::{TimeZone, Utc};
    use turnstile_core::session::SessionPolicy;

    use super::*;

    fn config() -> SessionConfig {
        SessionConfig {
            secret: "test-secret".into(),
            policy: SessionPolicy::default(),
            cookie_name: "session_token".into(),
            cookie_secure: false,
            store_timeout: std::time::Duration::from_secs(5),
        }
    }

    fn set_cookie_headers(jar: CookieJar) -> Vec<String> {
        let response = (jar, ()).into_response();
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    fn header_for<'a>(headers: &'a [String], name: &str) -> &'a str {
        headers
            .iter()
            .find(|h| h.starts_with(&format!("{name}=")))
            .unwrap_or_else(|| panic!("no Set-Cookie for {name}: {headers:?}"))
    }

    #[test]
    fn issued_cookies_carry_token_and_hint() {
        let token = SessionToken::parse("0123456789abcdef0123456789abcdef").unwrap();
        let next = Utc.with_ymd_and_hms(2026, 3, 1, 12, 9, 55).unwrap();

        let jar = set_session_cookies(CookieJar::new(), &config(), &token, next);
        let headers = set_cookie_headers(jar);
        assert_eq!(headers.len(), 2);

        let token_header = header_for(&headers, "session_token");
        assert!(token_header.starts_with("session_token=0123456789abcdef0123456789abcdef"));
        assert!(token_header.contains("HttpOnly"));
        assert!(token_header.contains("SameSite=Strict"));
        assert!(token_header.contains("Path=/"));
        assert!(token_header.contains("Max-Age=2592000"));
        assert!(!token_header.contains("Secure"));

        let hint_header = header_for(&headers, ROTATION_HINT_COOKIE);
        assert!(hint_header.starts_with(&format!("session_expiry={};", next.timestamp())));
        assert!(!hint_header.contains("HttpOnly"));
        assert!(hint_header.contains("Max-Age=2592000"));
    }

    #[test]
    fn secure_flag_follows_config() {
        let mut config = config();
        config.cookie_secure = true;
        let token = SessionToken::generate().unwrap();

        let jar = set_session_cookies(CookieJar::new(), &config, &token, Utc::now());
        let headers = set_cookie_headers(jar);
        assert!(headers.iter().all(|h| h.contains("Secure")));
    }

    #[test]
    fn clearing_emits_removals_for_absent_cookies() {
        let headers = set_cookie_headers(clear_session_cookies(CookieJar::new(), &config()));
        assert_eq!(headers.len(), 2);
        for name in ["session_token", ROTATION_HINT_COOKIE] {
            let header = header_for(&headers, name);
            assert!(header.starts_with(&format!("{name}=;")), "{header}");
            assert!(header.contains("Max-Age=0"), "{header}");
        }
    }

    #[test]
    fn reads_token_from_jar() {
        let jar = CookieJar::new().add(Cookie::new("session_token", "abc"));
        assert_eq!(session_token(&jar, &config()).as_deref(), Some("abc"));

        let empty = CookieJar::new().add(Cookie::new("session_token", ""));
        assert_eq!(session_token(&empty, &config()), None);
        assert_eq!(session_token(&CookieJar::new(), &config()), None);
    }
}
