use std::collections::{HashMap, HashSet};

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    confirm::DeleteConfirmation,
    forms::{BillingForm, ChangeRoleForm, FieldErrors, FormState, InviteForm},
    gate::Visibility,
    notifications::{Notification, Notifications},
};
use crate::api::{ApiError, ApiSession, WorkspaceApi};
use crate::models::{
    application::Account,
    invite::Invite,
    membership::Membership,
    subscription::Subscription,
    workspace::{BillingInfo, Workspace},
};

pub const HOME_PATH: &str = "/";

#[derive(Debug, Error)]
pub enum PageError {
    #[error("workspace '{0}' not found")]
    WorkspaceNotFound(String),
    #[error("{0}")]
    NotPermitted(&'static str),
    #[error("cannot act on your own membership")]
    CannotActOnSelf,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// What the caller should do after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Stay,
    Redirect(String),
}

/// One mounted settings page for one viewer and workspace.
#[derive(Debug)]
pub struct WorkspaceSettingsPage {
    session: ApiSession,
    account: Account,
    hosted: bool,
    workspace: Workspace,
    membership: Membership,
    subscription: Option<Subscription>,
    members: Vec<Membership>,
    invites: Vec<Invite>,
    expanded: HashSet<Uuid>,
    confirmation: DeleteConfirmation,
    billing: BillingInfo,
    invite_form: FormState<InviteForm>,
    billing_form: FormState<BillingForm>,
    role_errors: HashMap<Uuid, FieldErrors>,
    notifications: Notifications,
}

impl WorkspaceSettingsPage {
    /// Resolves the workspace from the application snapshot and loads the
    /// lists the viewer is allowed to see.
    pub async fn mount(
        api: &dyn WorkspaceApi,
        session: ApiSession,
        workspace_name: &str,
    ) -> Result<Self, PageError> {
        let application = api.get_application(&session).await?;
        let hosted = application.is_hosted();
        let context = application
            .workspace_by_name(workspace_name)
            .cloned()
            .ok_or_else(|| PageError::WorkspaceNotFound(workspace_name.to_string()))?;

        let billing = context.workspace.billing_info();
        let mut page = WorkspaceSettingsPage {
            session,
            account: application.account,
            hosted,
            billing_form: FormState::new(BillingForm::from(&billing)),
            billing,
            workspace: context.workspace,
            membership: context.membership,
            subscription: context.subscription,
            members: Vec::new(),
            invites: Vec::new(),
            expanded: HashSet::new(),
            confirmation: DeleteConfirmation::default(),
            invite_form: FormState::new(InviteForm::initial()),
            role_errors: HashMap::new(),
            notifications: Notifications::default(),
        };

        let visibility = page.visibility();
        if visibility.members {
            page.reload_members(api).await;
        }
        if visibility.invites {
            page.reload_invites(api).await;
        }

        tracing::debug!(
            workspace_id = %page.workspace.id,
            level = %page.membership.level,
            members = page.members.len(),
            invites = page.invites.len(),
            "mounted workspace settings page"
        );
        Ok(page)
    }

    /// Workspaces without a subscription record (self-hosted installs) never lapse.
    pub fn subscription_inactive(&self) -> bool {
        self.subscription
            .as_ref()
            .map(|sub| sub.is_inactive(OffsetDateTime::now_utc()))
            .unwrap_or(false)
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::for_viewer(
            self.membership.level,
            self.hosted,
            self.subscription_inactive(),
        )
    }

    pub async fn reload_members(&mut self, api: &dyn WorkspaceApi) {
        match api.get_members(&self.session, self.workspace.id).await {
            Ok(members) => {
                self.expanded
                    .retain(|id| members.iter().any(|member| member.id == *id));
                self.members = members;
            }
            Err(err) => {
                tracing::warn!(?err, workspace_id = %self.workspace.id, "failed to load members");
                self.notifications.fail(err.user_message());
            }
        }
    }

    pub async fn reload_invites(&mut self, api: &dyn WorkspaceApi) {
        match api.get_invites(&self.session, self.workspace.id).await {
            Ok(invites) => self.invites = invites,
            Err(err) => {
                tracing::warn!(?err, workspace_id = %self.workspace.id, "failed to load invites");
                self.notifications.fail(err.user_message());
            }
        }
    }

    /// Turns a mutation result into a failure notification. Returns true on success.
    fn report(&mut self, action: &'static str, result: Result<(), ApiError>) -> bool {
        match result {
            Ok(()) => {
                tracing::info!(workspace_id = %self.workspace.id, action, "workspace mutation succeeded");
                true
            }
            Err(err) => {
                tracing::warn!(?err, workspace_id = %self.workspace.id, action, "workspace mutation failed");
                self.notifications.fail(err.user_message());
                false
            }
        }
    }

    fn is_myself(&self, member: &Membership) -> bool {
        member.id == self.membership.id || member.belongs_to(self.account.id)
    }

    fn ensure_not_self(&self, member_id: Uuid) -> Result<(), PageError> {
        if member_id == self.membership.id
            || self
                .members
                .iter()
                .any(|member| member.id == member_id && self.is_myself(member))
        {
            return Err(PageError::CannotActOnSelf);
        }
        Ok(())
    }

    fn require(allowed: bool, reason: &'static str) -> Result<(), PageError> {
        if allowed {
            Ok(())
        } else {
            Err(PageError::NotPermitted(reason))
        }
    }

    pub fn toggle_member_details(&mut self, member_id: Uuid) -> Result<(), PageError> {
        Self::require(self.visibility().members, "Managing members requires admin rights")?;
        self.ensure_not_self(member_id)?;
        if !self.expanded.remove(&member_id) {
            self.expanded.insert(member_id);
        }
        Ok(())
    }

    pub async fn change_member_level(
        &mut self,
        api: &dyn WorkspaceApi,
        member_id: Uuid,
        form: &ChangeRoleForm,
    ) -> Result<Outcome, PageError> {
        Self::require(
            self.visibility().role_change,
            "Changing roles is not available for this workspace",
        )?;
        self.ensure_not_self(member_id)?;

        let level = match form.validate() {
            Ok(level) => level,
            Err(errors) => {
                self.role_errors.insert(member_id, errors);
                return Ok(Outcome::Stay);
            }
        };
        self.role_errors.remove(&member_id);

        let result = api
            .update_member_level(&self.session, self.workspace.id, member_id, level)
            .await;
        if self.report("update member level", result) {
            self.reload_members(api).await;
            self.notifications.success("role changed");
        }
        Ok(Outcome::Stay)
    }

    pub async fn remove_member(
        &mut self,
        api: &dyn WorkspaceApi,
        member_id: Uuid,
    ) -> Result<Outcome, PageError> {
        Self::require(self.visibility().members, "Managing members requires admin rights")?;
        self.ensure_not_self(member_id)?;

        let result = api
            .delete_member(&self.session, self.workspace.id, member_id)
            .await;
        if self.report("delete member", result) {
            self.reload_members(api).await;
            self.notifications.success("membership removed");
        }
        Ok(Outcome::Stay)
    }

    pub async fn create_invite(
        &mut self,
        api: &dyn WorkspaceApi,
        form: InviteForm,
    ) -> Result<Outcome, PageError> {
        Self::require(
            self.visibility().invite_form,
            "Sending invites is not available for this workspace",
        )?;

        let invite = match form.validate() {
            Ok(invite) => invite,
            Err(errors) => {
                self.invite_form = FormState {
                    values: form,
                    errors,
                };
                return Ok(Outcome::Stay);
            }
        };
        self.invite_form = FormState::new(form);

        let result = api
            .create_invite(&self.session, self.workspace.id, &invite.email, invite.level)
            .await;
        if self.report("create invite", result) {
            self.invite_form = FormState::new(InviteForm::initial());
            self.reload_invites(api).await;
            self.notifications.success("invite sent");
        }
        Ok(Outcome::Stay)
    }

    pub async fn cancel_invite(
        &mut self,
        api: &dyn WorkspaceApi,
        invite_id: Uuid,
    ) -> Result<Outcome, PageError> {
        Self::require(self.visibility().invites, "Managing invites requires admin rights")?;

        let result = api
            .delete_invite(&self.session, self.workspace.id, invite_id)
            .await;
        if self.report("delete invite", result) {
            self.reload_invites(api).await;
            self.notifications.success("invite canceled");
        }
        Ok(Outcome::Stay)
    }

    pub async fn resend_invite(
        &mut self,
        api: &dyn WorkspaceApi,
        invite_id: Uuid,
    ) -> Result<Outcome, PageError> {
        Self::require(
            self.visibility().resend_invite,
            "Resending invites is not available for this workspace",
        )?;

        let result = api
            .resend_invite(&self.session, self.workspace.id, invite_id)
            .await;
        if self.report("resend invite", result) {
            self.reload_invites(api).await;
            self.notifications.success("invite resent");
        }
        Ok(Outcome::Stay)
    }

    pub async fn leave_workspace(&mut self, api: &dyn WorkspaceApi) -> Result<Outcome, PageError> {
        Self::require(
            self.visibility().leave_form,
            "Owners cannot leave their own workspace",
        )?;

        let result = api.leave_workspace(&self.session, self.workspace.id).await;
        if self.report("leave workspace", result) {
            self.notifications.success("left workspace");
            return Ok(Outcome::Redirect(HOME_PATH.to_string()));
        }
        Ok(Outcome::Stay)
    }

    pub async fn change_billing_info(
        &mut self,
        api: &dyn WorkspaceApi,
        form: BillingForm,
    ) -> Result<Outcome, PageError> {
        Self::require(
            self.visibility().billing,
            "Billing information is only available to the owner",
        )?;

        let billing = match form.validate() {
            Ok(billing) => billing,
            Err(errors) => {
                self.billing_form = FormState {
                    values: form,
                    errors,
                };
                return Ok(Outcome::Stay);
            }
        };
        self.billing_form = FormState::new(form);

        let result = api
            .change_billing_info(&self.session, self.workspace.id, &billing)
            .await;
        if self.report("change billing info", result) {
            self.billing_form = FormState::new(BillingForm::from(&billing));
            self.billing = billing;
            self.notifications.success("settings changed");
        }
        Ok(Outcome::Stay)
    }

    /// First click on "Delete workspace": only reveals the confirm button.
    pub fn request_delete(&mut self) -> Result<Outcome, PageError> {
        Self::require(
            self.visibility().delete_workspace,
            "Only the owner can delete the workspace",
        )?;
        self.confirmation.request();
        Ok(Outcome::Stay)
    }

    /// Second click. Issues the delete call only if the confirm button was shown.
    pub async fn confirm_delete(&mut self, api: &dyn WorkspaceApi) -> Result<Outcome, PageError> {
        Self::require(
            self.visibility().delete_workspace,
            "Only the owner can delete the workspace",
        )?;
        if !self.confirmation.confirm() {
            tracing::debug!(workspace_id = %self.workspace.id, "delete confirmation not shown, ignoring");
            return Ok(Outcome::Stay);
        }

        let result = api.delete_workspace(&self.session, self.workspace.id).await;
        if self.report("delete workspace", result) {
            self.notifications.success("workspace deleted");
            return Ok(Outcome::Redirect(HOME_PATH.to_string()));
        }
        Ok(Outcome::Stay)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    pub fn pending_notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.pending()
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    pub fn members(&self) -> &[Membership] {
        &self.members
    }

    pub fn invites(&self) -> &[Invite] {
        &self.invites
    }

    pub fn billing(&self) -> &BillingInfo {
        &self.billing
    }

    pub fn invite_form(&self) -> &FormState<InviteForm> {
        &self.invite_form
    }

    pub fn billing_form(&self) -> &FormState<BillingForm> {
        &self.billing_form
    }

    pub fn role_errors(&self, member_id: Uuid) -> Option<&FieldErrors> {
        self.role_errors.get(&member_id)
    }

    pub fn is_expanded(&self, member_id: Uuid) -> bool {
        self.expanded.contains(&member_id)
    }

    pub fn is_own_row(&self, member: &Membership) -> bool {
        self.is_myself(member)
    }

    pub fn delete_confirmation(&self) -> DeleteConfirmation {
        self.confirmation
    }
}
