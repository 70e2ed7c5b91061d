use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Role rank inside a workspace. Declaration order is the rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberLevel {
    Viewer,
    Editor,
    Admin,
    Owner,
}

impl MemberLevel {
    pub const ALL: [MemberLevel; 4] = [
        MemberLevel::Viewer,
        MemberLevel::Editor,
        MemberLevel::Admin,
        MemberLevel::Owner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberLevel::Viewer => "VIEWER",
            MemberLevel::Editor => "EDITOR",
            MemberLevel::Admin => "ADMIN",
            MemberLevel::Owner => "OWNER",
        }
    }

    /// Display title used in member rows, invite rows and level pickers.
    pub fn title(&self) -> &'static str {
        match self {
            MemberLevel::Viewer => "Viewer",
            MemberLevel::Editor => "Editor",
            MemberLevel::Admin => "Administrator",
            MemberLevel::Owner => "Owner",
        }
    }

    pub fn is_editor(&self) -> bool {
        *self >= MemberLevel::Editor
    }

    pub fn is_admin_or_owner(&self) -> bool {
        *self >= MemberLevel::Admin
    }
}

impl fmt::Display for MemberLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMemberLevel(pub String);

impl fmt::Display for UnknownMemberLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown member level '{}'", self.0)
    }
}

impl std::error::Error for UnknownMemberLevel {}

impl FromStr for MemberLevel {
    type Err = UnknownMemberLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        MemberLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownMemberLevel(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub email: String,
    pub level: MemberLevel,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Membership {
    pub fn belongs_to(&self, account_id: Uuid) -> bool {
        self.account_id == account_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMemberLevelPayload {
    pub level: MemberLevel,
}

/// Number of memberships that can edit (EDITOR or above).
pub fn count_editors(members: &[Membership]) -> usize {
    members.iter().filter(|m| m.level.is_editor()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn levels_are_ranked_viewer_to_owner() {
        assert!(MemberLevel::Viewer < MemberLevel::Editor);
        assert!(MemberLevel::Editor < MemberLevel::Admin);
        assert!(MemberLevel::Admin < MemberLevel::Owner);
        assert!(!MemberLevel::Viewer.is_editor());
        assert!(MemberLevel::Owner.is_editor());
        assert!(!MemberLevel::Editor.is_admin_or_owner());
        assert!(MemberLevel::Admin.is_admin_or_owner());
    }

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!("ADMIN".parse::<MemberLevel>(), Ok(MemberLevel::Admin));
        assert_eq!(" viewer ".parse::<MemberLevel>(), Ok(MemberLevel::Viewer));
        assert_eq!(
            "GUEST".parse::<MemberLevel>(),
            Err(UnknownMemberLevel("GUEST".into()))
        );
    }

    #[test]
    fn deserializes_membership_from_api_json() {
        let raw = json!({
            "id": "5f0c6a8e-4b6f-4d57-9f2a-2f7a3f0b7e11",
            "accountId": "0b6a3c1d-9a57-4b2e-8d3f-6c2f1e0a9b44",
            "name": "Ada",
            "email": "ada@example.com",
            "level": "EDITOR",
            "createdAt": "2024-03-01T10:00:00Z"
        });

        let membership: Membership = serde_json::from_value(raw).expect("membership");
        assert_eq!(membership.level, MemberLevel::Editor);
        assert_eq!(membership.email, "ada@example.com");
        assert_eq!(membership.created_at.year(), 2024);
    }
}
