pub mod http;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    application::Application,
    invite::Invite,
    membership::{MemberLevel, Membership},
    workspace::BillingInfo,
};

pub use http::HttpWorkspaceApi;
#[cfg(test)]
pub use mock::MockWorkspaceApi;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("workspace API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("workspace API responded with status {status}: {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("workspace API returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Text shown to the user in a failure notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::Http(_) => "Could not reach the server. Please try again.".to_string(),
            ApiError::InvalidResponse(_) => {
                "The server sent an unexpected response. Please try again.".to_string()
            }
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ApiError::Rejected { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }
}

/// Credentials of the viewer, forwarded to the workspace API on every call.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSession {
    token: String,
}

impl ApiSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Stable, non-reversible identifier of the session, usable as a map key.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.token.as_bytes()))
    }
}

impl fmt::Debug for ApiSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSession")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    async fn get_application(&self, session: &ApiSession) -> Result<Application, ApiError>;

    async fn get_members(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
    ) -> Result<Vec<Membership>, ApiError>;

    async fn update_member_level(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
        member_id: Uuid,
        level: MemberLevel,
    ) -> Result<(), ApiError>;

    async fn delete_member(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
        member_id: Uuid,
    ) -> Result<(), ApiError>;

    async fn get_invites(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
    ) -> Result<Vec<Invite>, ApiError>;

    async fn create_invite(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
        email: &str,
        level: MemberLevel,
    ) -> Result<(), ApiError>;

    async fn delete_invite(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
        invite_id: Uuid,
    ) -> Result<(), ApiError>;

    async fn resend_invite(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
        invite_id: Uuid,
    ) -> Result<(), ApiError>;

    async fn leave_workspace(&self, session: &ApiSession, workspace_id: Uuid)
        -> Result<(), ApiError>;

    async fn delete_workspace(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
    ) -> Result<(), ApiError>;

    async fn change_billing_info(
        &self,
        session: &ApiSession,
        workspace_id: Uuid,
        billing: &BillingInfo,
    ) -> Result<(), ApiError>;
}
