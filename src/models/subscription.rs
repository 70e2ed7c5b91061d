use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionLevel {
    Trial,
    Basic,
    Pro,
    #[serde(other)]
    Unknown,
}

impl SubscriptionLevel {
    pub fn as_text(&self) -> &'static str {
        match self {
            SubscriptionLevel::Trial => "Trial",
            SubscriptionLevel::Basic => "Basic",
            SubscriptionLevel::Pro => "Pro",
            SubscriptionLevel::Unknown => "Unknown plan",
        }
    }
}

/// Status reported by the payment provider for the workspace subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalStatus {
    Incomplete,
    IncompleteExpired,
    Trialing,
    Active,
    PastDue,
    Canceled,
    Unpaid,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub level: SubscriptionLevel,
    pub external_status: ExternalStatus,
    pub number_of_editors: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub from_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expiration_date: OffsetDateTime,
}

impl Subscription {
    /// Only active and trialing subscriptions can be in good standing, and
    /// only until their expiration date.
    pub fn is_inactive(&self, now: OffsetDateTime) -> bool {
        match self.external_status {
            ExternalStatus::Active | ExternalStatus::Trialing => self.expiration_date <= now,
            _ => true,
        }
    }

    pub fn status_text(&self, now: OffsetDateTime) -> &'static str {
        match self.external_status {
            ExternalStatus::Incomplete => "Inactive (please pay initial payment)",
            ExternalStatus::IncompleteExpired => "Inactive (initial payment not received)",
            ExternalStatus::Active => {
                if self.is_inactive(now) {
                    "Inactive (subscription expired)"
                } else {
                    "Active (subscribed to a paid monthly plan)"
                }
            }
            ExternalStatus::Trialing => {
                if self.is_inactive(now) {
                    "Inactive (trial ended)"
                } else {
                    "Active (trial)"
                }
            }
            ExternalStatus::PastDue => "Inactive (payment is past due)",
            ExternalStatus::Canceled => "Inactive (canceled by user or due to unpaid invoice)",
            ExternalStatus::Unpaid => "Inactive (invoice unpaid)",
            ExternalStatus::Unknown => "Inactive (unknown status)",
        }
    }
}
