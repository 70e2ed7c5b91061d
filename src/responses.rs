use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct JsonResponse {
    pub status: String,
    pub success: bool,
    pub message: String,
    pub code: Option<String>,
}

impl JsonResponse {
    fn error(status: StatusCode, msg: &str, code: Option<&str>) -> Response {
        (
            status,
            Json(JsonResponse {
                status: "error".to_string(),
                success: false,
                message: msg.to_string(),
                code: code.map(str::to_string),
            }),
        )
            .into_response()
    }

    pub fn success(msg: &str) -> Response {
        (
            StatusCode::OK,
            Json(JsonResponse {
                status: "success".to_string(),
                success: true,
                message: msg.to_string(),
                code: None,
            }),
        )
            .into_response()
    }

    pub fn not_found(msg: &str) -> Response {
        Self::error(StatusCode::NOT_FOUND, msg, None)
    }

    pub fn forbidden(msg: &str) -> Response {
        Self::error(StatusCode::FORBIDDEN, msg, None)
    }

    pub fn forbidden_with_code(msg: &str, code: &str) -> Response {
        Self::error(StatusCode::FORBIDDEN, msg, Some(code))
    }

    pub fn bad_gateway(msg: &str) -> Response {
        Self::error(StatusCode::BAD_GATEWAY, msg, None)
    }

    pub fn too_many_requests(msg: &str) -> Response {
        Self::error(StatusCode::TOO_MANY_REQUESTS, msg, None)
    }

    pub fn redirect_to_login_with_error(frontend_origin: &str, msg: &str) -> Response {
        let redirect_url = format!(
            "{}/login?error={}",
            frontend_origin.trim_end_matches('/'),
            urlencoding::encode(msg)
        );
        Redirect::to(&redirect_url).into_response()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::from_slice;

    use crate::responses::JsonResponse;

    #[tokio::test]
    async fn test_success_response() {
        let resp = JsonResponse::success("ok");
        assert_eq!(resp.status(), axum::http::StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let json: JsonResponse = from_slice(&body).unwrap();
        assert_eq!(json.status, "success");
        assert!(json.success);
        assert_eq!(json.message, "ok");
    }

    #[tokio::test]
    async fn test_forbidden_with_code_response() {
        let resp = JsonResponse::forbidden_with_code("nope", "CSRF_MISMATCH");
        assert_eq!(resp.status(), axum::http::StatusCode::FORBIDDEN);

        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let json: JsonResponse = from_slice(&body).unwrap();
        assert_eq!(json.status, "error");
        assert!(!json.success);
        assert_eq!(json.message, "nope");
        assert_eq!(json.code.as_deref(), Some("CSRF_MISMATCH"));
    }

    #[tokio::test]
    async fn test_redirect_to_login_with_error() {
        let resp =
            JsonResponse::redirect_to_login_with_error("https://example.com/", "token expired");
        assert_eq!(resp.status(), axum::http::StatusCode::SEE_OTHER);

        if let Some(loc) = resp.headers().get("location") {
            let loc_str = loc.to_str().unwrap();
            assert!(loc_str.starts_with("https://example.com/login?error="));
            assert!(loc_str.contains("token%20expired"));
        } else {
            panic!("Redirect did not contain a location header");
        }
    }
}
