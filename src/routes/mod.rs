pub mod session;
pub mod settings;

use axum::{
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::responses::JsonResponse;
use crate::state::AppState;

/// Liveness probe.
pub async fn healthz() -> Response {
    JsonResponse::success("ok")
}

/// All routes of the service. Rate limiting is layered on by the binary since
/// it needs the peer address.
pub fn router(state: AppState) -> Router {
    let settings_routes = Router::new()
        .route("/", get(settings::show_settings))
        .route("/members/{member_id}/toggle", post(settings::toggle_member))
        .route("/members/{member_id}/level", post(settings::change_member_level))
        .route("/members/{member_id}/remove", post(settings::remove_member))
        .route("/invites", post(settings::create_invite))
        .route("/invites/{invite_id}/cancel", post(settings::cancel_invite))
        .route("/invites/{invite_id}/resend", post(settings::resend_invite))
        .route("/leave", post(settings::leave_workspace))
        .route("/billing", post(settings::change_billing_info))
        .route("/delete", post(settings::request_delete))
        .route("/delete/confirm", post(settings::confirm_delete));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/{workspace}/settings", settings_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::api::mock::MockWorkspaceApi;
    use crate::config::{Config, LogFormat};
    use crate::store::PageStore;

    pub(crate) fn test_config() -> Config {
        Config {
            workspace_api_url: "http://api.test".into(),
            frontend_origin: "https://app.test".into(),
            bind_addr: ([127, 0, 0, 1], 0).into(),
            auth_cookie_secure: true,
            api_timeout: Duration::from_secs(5),
            page_idle_timeout: Duration::from_secs(60),
            rate_limit_ms: 200,
            rate_limit_burst: 20,
            log_format: LogFormat::Pretty,
        }
    }

    pub(crate) fn test_state(api: MockWorkspaceApi) -> AppState {
        AppState {
            api: Arc::new(api),
            pages: Arc::new(PageStore::new()),
            config: Arc::new(test_config()),
        }
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let app = router(test_state(MockWorkspaceApi::new()));
        let res = app
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "ok");
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let app = router(test_state(MockWorkspaceApi::new()));
        let res = app
            .oneshot(Request::get("/acme/elsewhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
