use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub allow_external_sharing: bool,
    #[serde(default)]
    pub eu_vat: String,
    #[serde(default)]
    pub external_billing_email: String,
}

impl Workspace {
    pub fn billing_info(&self) -> BillingInfo {
        BillingInfo {
            eu_vat: self.eu_vat.clone(),
            external_billing_email: self.external_billing_email.clone(),
        }
    }
}

/// Editable billing fields of a workspace. Also the body of the change-billing call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingInfo {
    pub eu_vat: String,
    pub external_billing_email: String,
}
