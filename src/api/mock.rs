#![allow(dead_code)]
use super::{ApiError, ApiSession, WorkspaceApi};
use crate::models::{
    application::Application,
    invite::Invite,
    membership::{MemberLevel, Membership},
    workspace::BillingInfo,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use uuid::Uuid;

/// Every call the fake received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    GetApplication,
    GetMembers(Uuid),
    UpdateMemberLevel(Uuid, Uuid, MemberLevel),
    DeleteMember(Uuid, Uuid),
    GetInvites(Uuid),
    CreateInvite(Uuid, String, MemberLevel),
    DeleteInvite(Uuid, Uuid),
    ResendInvite(Uuid, Uuid),
    LeaveWorkspace(Uuid),
    DeleteWorkspace(Uuid),
    ChangeBillingInfo(Uuid, BillingInfo),
}

impl ApiCall {
    fn kind(&self) -> &'static str {
        match self {
            ApiCall::GetApplication => "get_application",
            ApiCall::GetMembers(_) => "get_members",
            ApiCall::UpdateMemberLevel(..) => "update_member_level",
            ApiCall::DeleteMember(..) => "delete_member",
            ApiCall::GetInvites(_) => "get_invites",
            ApiCall::CreateInvite(..) => "create_invite",
            ApiCall::DeleteInvite(..) => "delete_invite",
            ApiCall::ResendInvite(..) => "resend_invite",
            ApiCall::LeaveWorkspace(_) => "leave_workspace",
            ApiCall::DeleteWorkspace(_) => "delete_workspace",
            ApiCall::ChangeBillingInfo(..) => "change_billing_info",
        }
    }
}

/// In-memory stand-in for the workspace REST API.
///
/// Mutations are applied to the stored members and invites so a reload after
/// a successful call observes the change. `reject` makes the next call of a
/// given kind fail with the supplied server message, `disconnect` makes it
/// fail as if the server could not be reached.
#[derive(Clone, Default)]
pub struct MockWorkspaceApi {
    pub application: Arc<Mutex<Option<Application>>>,
    pub members: Arc<Mutex<Vec<Membership>>>,
    pub invites: Arc<Mutex<Vec<Invite>>>,
    pub calls: Arc<Mutex<Vec<ApiCall>>>,
    pub rejections: Arc<Mutex<HashMap<&'static str, (StatusCode, String)>>>,
    pub invalid: Arc<Mutex<Vec<&'static str>>>,
    pub unreachable: Arc<Mutex<Vec<&'static str>>>,
}

impl MockWorkspaceApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_application(self, application: Application) -> Self {
        *self.application.lock().unwrap() = Some(application);
        self
    }

    pub fn with_members(self, members: Vec<Membership>) -> Self {
        *self.members.lock().unwrap() = members;
        self
    }

    pub fn with_invites(self, invites: Vec<Invite>) -> Self {
        *self.invites.lock().unwrap() = invites;
        self
    }

    /// Fail the next call named `kind` (e.g. `"create_invite"`) with `message`.
    pub fn reject(&self, kind: &'static str, status: StatusCode, message: &str) {
        self.rejections
            .lock()
            .unwrap()
            .insert(kind, (status, message.to_string()));
    }

    /// Make the next call named `kind` return an undecodable response.
    pub fn garble(&self, kind: &'static str) {
        self.invalid.lock().unwrap().push(kind);
    }

    /// Make the next call named `kind` fail with a transport error.
    pub fn disconnect(&self, kind: &'static str) {
        self.unreachable.lock().unwrap().push(kind);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, kind: &'static str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.kind() == kind)
            .count()
    }

    fn record(&self, call: ApiCall) -> Result<(), ApiError> {
        let kind = call.kind();
        self.calls.lock().unwrap().push(call);

        if let Some((status, message)) = self.rejections.lock().unwrap().remove(kind) {
            return Err(ApiError::Rejected { status, message });
        }

        let mut unreachable = self.unreachable.lock().unwrap();
        if let Some(pos) = unreachable.iter().position(|k| *k == kind) {
            unreachable.remove(pos);
            return Err(ApiError::Http(transport_error()));
        }
        drop(unreachable);

        let mut invalid = self.invalid.lock().unwrap();
        if let Some(pos) = invalid.iter().position(|k| *k == kind) {
            invalid.remove(pos);
            return Err(ApiError::InvalidResponse(format!("garbled {kind} response")));
        }
        Ok(())
    }
}

/// A `reqwest::Error` without touching the network: the URL never parses.
fn transport_error() -> reqwest::Error {
    reqwest::Client::new()
        .get("http://[::1")
        .build()
        .expect_err("unparsable url")
}

#[async_trait]
impl WorkspaceApi for MockWorkspaceApi {
    async fn get_application(&self, _session: &ApiSession) -> Result<Application, ApiError> {
        self.record(ApiCall::GetApplication)?;
        self.application.lock().unwrap().clone().ok_or(ApiError::Rejected {
            status: StatusCode::UNAUTHORIZED,
            message: "Not signed in".into(),
        })
    }

    async fn get_members(
        &self,
        _session: &ApiSession,
        workspace_id: Uuid,
    ) -> Result<Vec<Membership>, ApiError> {
        self.record(ApiCall::GetMembers(workspace_id))?;
        Ok(self.members.lock().unwrap().clone())
    }

    async fn update_member_level(
        &self,
        _session: &ApiSession,
        workspace_id: Uuid,
        member_id: Uuid,
        level: MemberLevel,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::UpdateMemberLevel(workspace_id, member_id, level))?;
        let mut members = self.members.lock().unwrap();
        match members.iter_mut().find(|m| m.id == member_id) {
            Some(member) => {
                member.level = level;
                Ok(())
            }
            None => Err(ApiError::Rejected {
                status: StatusCode::NOT_FOUND,
                message: "Membership not found".into(),
            }),
        }
    }

    async fn delete_member(
        &self,
        _session: &ApiSession,
        workspace_id: Uuid,
        member_id: Uuid,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::DeleteMember(workspace_id, member_id))?;
        self.members.lock().unwrap().retain(|m| m.id != member_id);
        Ok(())
    }

    async fn get_invites(
        &self,
        _session: &ApiSession,
        workspace_id: Uuid,
    ) -> Result<Vec<Invite>, ApiError> {
        self.record(ApiCall::GetInvites(workspace_id))?;
        Ok(self.invites.lock().unwrap().clone())
    }

    async fn create_invite(
        &self,
        _session: &ApiSession,
        workspace_id: Uuid,
        email: &str,
        level: MemberLevel,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::CreateInvite(workspace_id, email.to_string(), level))?;
        self.invites.lock().unwrap().push(Invite {
            id: Uuid::new_v4(),
            email: email.to_string(),
            level,
            created_by_name: "Mock".into(),
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(())
    }

    async fn delete_invite(
        &self,
        _session: &ApiSession,
        workspace_id: Uuid,
        invite_id: Uuid,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::DeleteInvite(workspace_id, invite_id))?;
        self.invites.lock().unwrap().retain(|i| i.id != invite_id);
        Ok(())
    }

    async fn resend_invite(
        &self,
        _session: &ApiSession,
        workspace_id: Uuid,
        invite_id: Uuid,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::ResendInvite(workspace_id, invite_id))
    }

    async fn leave_workspace(
        &self,
        _session: &ApiSession,
        workspace_id: Uuid,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::LeaveWorkspace(workspace_id))
    }

    async fn delete_workspace(
        &self,
        _session: &ApiSession,
        workspace_id: Uuid,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::DeleteWorkspace(workspace_id))
    }

    async fn change_billing_info(
        &self,
        _session: &ApiSession,
        workspace_id: Uuid,
        billing: &BillingInfo,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::ChangeBillingInfo(workspace_id, billing.clone()))
    }
}

/// Canned records shared by tests across the crate.
pub mod fixtures {
    use crate::models::{
        application::{Account, AppMode, Application, WorkspaceContext},
        invite::Invite,
        membership::{MemberLevel, Membership},
        subscription::{ExternalStatus, Subscription, SubscriptionLevel},
        workspace::Workspace,
    };
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    pub const WORKSPACE_NAME: &str = "acme";

    pub fn workspace_id() -> Uuid {
        Uuid::parse_str("9d7b3f52-8b7a-4f5e-a0f3-1d2c3b4a5e6f").unwrap()
    }

    pub fn account() -> Account {
        Account {
            id: Uuid::parse_str("0b6a3c1d-9a57-4b2e-8d3f-6c2f1e0a9b44").unwrap(),
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
        }
    }

    pub fn workspace() -> Workspace {
        Workspace {
            id: workspace_id(),
            name: WORKSPACE_NAME.into(),
            allow_external_sharing: false,
            eu_vat: "SE556677889901".into(),
            external_billing_email: "billing@acme.test".into(),
        }
    }

    pub fn membership(account_id: Uuid, name: &str, level: MemberLevel) -> Membership {
        Membership {
            id: Uuid::new_v4(),
            account_id,
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            level,
            created_at: OffsetDateTime::now_utc() - Duration::days(3),
        }
    }

    /// The signed-in account's own membership row.
    pub fn own_membership(level: MemberLevel) -> Membership {
        let me = account();
        Membership {
            id: Uuid::parse_str("5f0c6a8e-4b6f-4d57-9f2a-2f7a3f0b7e11").unwrap(),
            account_id: me.id,
            name: me.name,
            email: me.email,
            level,
            created_at: OffsetDateTime::now_utc() - Duration::days(30),
        }
    }

    pub fn subscription(status: ExternalStatus, expires_in: Duration) -> Subscription {
        let now = OffsetDateTime::now_utc();
        Subscription {
            level: SubscriptionLevel::Pro,
            external_status: status,
            number_of_editors: 5,
            from_date: now - Duration::days(10),
            expiration_date: now + expires_in,
        }
    }

    pub fn active_subscription() -> Subscription {
        subscription(ExternalStatus::Active, Duration::days(20))
    }

    pub fn lapsed_subscription() -> Subscription {
        subscription(ExternalStatus::PastDue, -Duration::days(2))
    }

    pub fn application(
        level: MemberLevel,
        mode: AppMode,
        subscription: Option<Subscription>,
    ) -> Application {
        Application {
            mode,
            account: account(),
            workspaces: vec![WorkspaceContext {
                workspace: workspace(),
                membership: own_membership(level),
                subscription,
            }],
        }
    }

    /// Own membership plus two colleagues.
    pub fn team(level: MemberLevel) -> Vec<Membership> {
        vec![
            own_membership(level),
            membership(Uuid::new_v4(), "Grace", MemberLevel::Editor),
            membership(Uuid::new_v4(), "Linus", MemberLevel::Viewer),
        ]
    }

    pub fn invite(email: &str, level: MemberLevel) -> Invite {
        Invite {
            id: Uuid::new_v4(),
            email: email.into(),
            level,
            created_by_name: "Ada Lovelace".into(),
            created_at: OffsetDateTime::now_utc() - Duration::hours(5),
        }
    }

    /// A fake API seeded for `level` in hosted mode with an active plan.
    pub fn hosted_api(level: MemberLevel) -> super::MockWorkspaceApi {
        super::MockWorkspaceApi::new()
            .with_application(application(
                level,
                AppMode::Hosted,
                Some(active_subscription()),
            ))
            .with_members(team(level))
            .with_invites(vec![invite("pending@example.com", MemberLevel::Viewer)])
    }
}
