use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ProfileCategory {
    Child,
    Teen,
    Adult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub age: u8,
    pub category: ProfileCategory,
}

/// What the signed-in account is entitled to. Decides where a failed
/// device search leads.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatus {
    pub has_subscription: bool,
    pub owns_hardware: bool,
}

impl AccountStatus {
    /// A headset is on its way (or already owned) when either flag is set.
    pub fn expects_device(&self) -> bool {
        self.has_subscription || self.owns_hardware
    }
}
