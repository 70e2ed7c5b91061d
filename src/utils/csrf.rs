use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{self, prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use rand_core::RngCore;

pub const CSRF_COOKIE: &str = "csrf_token";

pub fn generate_csrf_token() -> String {
    let mut bytes = [0u8; 32]; // 256-bit token
    rand_core::OsRng.fill_bytes(&mut bytes);
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

pub fn csrf_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .build()
}

/// Reuses the token already held by the browser, or mints a new one. The
/// returned jar carries the cookie when a new token was minted.
pub fn ensure_csrf_token(jar: CookieJar, secure: bool) -> (CookieJar, String) {
    if let Some(existing) = jar.get(CSRF_COOKIE).map(|c| c.value().to_string()) {
        if !existing.is_empty() {
            return (jar, existing);
        }
    }
    let token = generate_csrf_token();
    (jar.add(csrf_cookie(token.clone(), secure)), token)
}

/// Double-submit check: the form field must equal the cookie.
pub fn verify_csrf(jar: &CookieJar, submitted: Option<&str>) -> bool {
    match (jar.get(CSRF_COOKIE), submitted) {
        (Some(cookie), Some(field)) => !field.is_empty() && cookie.value() == field,
        _ => false,
    }
}
