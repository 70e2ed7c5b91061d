use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{membership::Membership, subscription::Subscription, workspace::Workspace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppMode {
    Hosted,
    SelfHosted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// One workspace as seen by the signed-in account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceContext {
    pub workspace: Workspace,
    pub membership: Membership,
    #[serde(default)]
    pub subscription: Option<Subscription>,
}

/// Snapshot of the signed-in user's application state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub mode: AppMode,
    pub account: Account,
    #[serde(default)]
    pub workspaces: Vec<WorkspaceContext>,
}

impl Application {
    pub fn is_hosted(&self) -> bool {
        self.mode == AppMode::Hosted
    }

    pub fn workspace_by_name(&self, name: &str) -> Option<&WorkspaceContext> {
        self.workspaces.iter().find(|ctx| ctx.workspace.name == name)
    }
}
