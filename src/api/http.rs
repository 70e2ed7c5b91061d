use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use uuid::Uuid;

use super::{ApiError, ApiSession, WorkspaceApi};
use crate::models::{
    application::Application,
    invite::{CreateInvitePayload, Invite},
    membership::{MemberLevel, Membership, UpdateMemberLevelPayload},
    workspace::BillingInfo,
};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// reqwest-backed client for the workspace REST API.
#[derive(Clone)]
pub struct HttpWorkspaceApi {
    client: Client,
    base_url: String,
}

impl HttpWorkspaceApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn build_request(&self, session: &ApiSession, method: Method, path: &str) -> RequestBuilder {
        let url = build_url(&self.base_url, path);
        self.client
            .request(method, url)
            .bearer_auth(session.token())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        session: &ApiSession,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = self.build_request(session, Method::GET, path).send().await?;
        let response = ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        ensure_success(response).await.map(|_| ())
    }
}

fn build_url(base: &str, path: &str) -> String {
    let trimmed_base = base.trim_end_matches('/');
    let trimmed_path = path.trim_start_matches('/');
    format!("{}/{}", trimmed_base, trimmed_path)
}

fn workspace_path(workspace_id: Uuid, rest: &str) -> String {
    if rest.is_empty() {
        format!("api/workspaces/{}", workspace_id)
    } else {
        format!("api/workspaces/{}/{}", workspace_id, rest)
    }
}

/// Maps a not-ok response onto `ApiError::Rejected`, preferring the server's `message`.
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.message)
        .map(|msg| msg.trim().to_string())
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    Err(ApiError::Rejected { status, message })
}

#[async_trait]
impl WorkspaceApi for HttpWorkspaceApi {
    async fn get_application(&self, session: &ApiSession) -> Result<Application, ApiError> {
        self.fetch(session, "api/application").await
    }

    async fn get_members(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
    ) -> Result<Vec<Membership>, ApiError> {
        self.fetch(session, &workspace_path(workspace_id, "members"))
            .await
    }

    async fn update_member_level(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
        member_id: Uuid,
        level: MemberLevel,
    ) -> Result<(), ApiError> {
        let path = workspace_path(workspace_id, &format!("members/{}", member_id));
        let request = self
            .build_request(session, Method::PUT, &path)
            .json(&UpdateMemberLevelPayload { level });
        self.execute(request).await
    }

    async fn delete_member(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
        member_id: Uuid,
    ) -> Result<(), ApiError> {
        let path = workspace_path(workspace_id, &format!("members/{}", member_id));
        self.execute(self.build_request(session, Method::DELETE, &path))
            .await
    }

    async fn get_invites(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
    ) -> Result<Vec<Invite>, ApiError> {
        self.fetch(session, &workspace_path(workspace_id, "invites"))
            .await
    }

    async fn create_invite(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
        email: &str,
        level: MemberLevel,
    ) -> Result<(), ApiError> {
        let path = workspace_path(workspace_id, "invites");
        let request = self
            .build_request(session, Method::POST, &path)
            .json(&CreateInvitePayload {
                email: email.to_string(),
                level,
            });
        self.execute(request).await
    }

    async fn delete_invite(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
        invite_id: Uuid,
    ) -> Result<(), ApiError> {
        let path = workspace_path(workspace_id, &format!("invites/{}", invite_id));
        self.execute(self.build_request(session, Method::DELETE, &path))
            .await
    }

    async fn resend_invite(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
        invite_id: Uuid,
    ) -> Result<(), ApiError> {
        let path = workspace_path(workspace_id, &format!("invites/{}/resend", invite_id));
        let request = self
            .build_request(session, Method::POST, &path)
            .json(&json!({}));
        self.execute(request).await
    }

    async fn leave_workspace(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
    ) -> Result<(), ApiError> {
        let path = workspace_path(workspace_id, "leave");
        let request = self
            .build_request(session, Method::POST, &path)
            .json(&json!({}));
        self.execute(request).await
    }

    async fn delete_workspace(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
    ) -> Result<(), ApiError> {
        let path = workspace_path(workspace_id, "");
        self.execute(self.build_request(session, Method::DELETE, &path))
            .await
    }

    async fn change_billing_info(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
        billing: &BillingInfo,
    ) -> Result<(), ApiError> {
        let path = workspace_path(workspace_id, "billing");
        let request = self
            .build_request(session, Method::PUT, &path)
            .json(billing);
        self.execute(request).await
    }
}
