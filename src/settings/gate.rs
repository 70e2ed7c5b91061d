use crate::models::membership::MemberLevel;

/// Which panels and sub-forms of the settings page the viewer may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub leave_form: bool,
    pub plan: bool,
    pub billing: bool,
    pub invites: bool,
    pub invite_form: bool,
    pub resend_invite: bool,
    pub members: bool,
    pub role_change: bool,
    pub delete_workspace: bool,
}

impl Visibility {
    pub fn for_viewer(level: MemberLevel, hosted: bool, subscription_inactive: bool) -> Self {
        let owner = level == MemberLevel::Owner;
        let manager = level.is_admin_or_owner();

        Visibility {
            // owners cannot leave their own workspace
            leave_form: !owner,
            plan: owner && hosted,
            billing: owner && hosted,
            invites: manager,
            invite_form: manager && !subscription_inactive,
            resend_invite: manager && !subscription_inactive,
            members: manager,
            role_change: manager && !subscription_inactive,
            delete_workspace: owner,
        }
    }
}
