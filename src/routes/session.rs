use axum::{extract::FromRequestParts, http::request::Parts, response::Response};
use axum_extra::extract::cookie::CookieJar;

use crate::api::ApiSession;
use crate::responses::JsonResponse;
use crate::state::AppState;

pub const AUTH_COOKIE: &str = "auth_token";

/// The signed-in viewer, taken from the `auth_token` cookie. Requests without
/// one are sent to the login page of the main app.
#[derive(Debug)]
pub struct Viewer(pub ApiSession);

impl FromRequestParts<AppState> for Viewer {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(AUTH_COOKIE)
            .map(|cookie| cookie.value().trim().to_string())
            .filter(|token| !token.is_empty());

        match token {
            Some(token) => Ok(Viewer(ApiSession::new(token))),
            None => {
                tracing::debug!(path = %parts.uri.path(), "request without auth cookie");
                Err(JsonResponse::redirect_to_login_with_error(
                    &state.config.frontend_origin,
                    "Please log in to continue",
                ))
            }
        }
    }
}
