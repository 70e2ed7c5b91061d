use serde::Deserialize;
use std::collections::BTreeMap;

use crate::models::{membership::MemberLevel, workspace::BillingInfo};

pub const REQUIRED: &str = "Required.";
pub const INVALID: &str = "Invalid.";
pub const INVALID_EMAIL: &str = "Invalid email address";

/// Field name -> message, in field order.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

pub fn is_valid_email_address(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return false;
    }
    let mut parts = trimmed.split('@');
    let local = parts.next().unwrap_or("");
    let domain = match parts.next() {
        Some(d) => d,
        None => return false,
    };
    if parts.next().is_some() {
        return false;
    }
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return false;
    }
    domain.contains('.')
}

fn parse_level(raw: &str, errors: &mut FieldErrors) -> Option<MemberLevel> {
    if raw.trim().is_empty() {
        errors.insert("level", REQUIRED);
        return None;
    }
    match raw.parse::<MemberLevel>() {
        Ok(level) => Some(level),
        Err(_) => {
            errors.insert("level", INVALID);
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InviteForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidInvite {
    pub email: String,
    pub level: MemberLevel,
}

impl InviteForm {
    /// Blank form as first shown: no email, VIEWER preselected.
    pub fn initial() -> Self {
        InviteForm {
            email: String::new(),
            level: MemberLevel::Viewer.as_str().to_string(),
        }
    }

    pub fn validate(&self) -> Result<ValidInvite, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = self.email.trim();
        if email.is_empty() {
            errors.insert("email", REQUIRED);
        } else if !is_valid_email_address(email) {
            errors.insert("email", INVALID);
        }
        let level = parse_level(&self.level, &mut errors);

        match level {
            Some(level) if errors.is_empty() => Ok(ValidInvite {
                email: email.to_string(),
                level,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChangeRoleForm {
    #[serde(default)]
    pub level: String,
}

impl ChangeRoleForm {
    pub fn validate(&self) -> Result<MemberLevel, FieldErrors> {
        let mut errors = FieldErrors::new();
        parse_level(&self.level, &mut errors).ok_or(errors)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BillingForm {
    #[serde(default)]
    pub eu_vat: String,
    #[serde(default)]
    pub external_billing_email: String,
}

impl From<&BillingInfo> for BillingForm {
    fn from(info: &BillingInfo) -> Self {
        BillingForm {
            eu_vat: info.eu_vat.clone(),
            external_billing_email: info.external_billing_email.clone(),
        }
    }
}

impl BillingForm {
    pub fn validate(&self) -> Result<BillingInfo, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = self.external_billing_email.trim();
        if email.is_empty() {
            errors.insert("external_billing_email", REQUIRED);
        } else if !is_valid_email_address(email) {
            errors.insert("external_billing_email", INVALID_EMAIL);
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(BillingInfo {
            eu_vat: self.eu_vat.trim().to_string(),
            external_billing_email: email.to_string(),
        })
    }
}

/// Values and errors of a form as last submitted, for re-rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState<T> {
    pub values: T,
    pub errors: FieldErrors,
}

impl<T> FormState<T> {
    pub fn new(values: T) -> Self {
        FormState {
            values,
            errors: FieldErrors::new(),
        }
    }

    pub fn error(&self, field: &str) -> Option<&'static str> {
        self.errors.get(field).copied()
    }
}
