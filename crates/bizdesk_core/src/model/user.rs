//! Single business-owner profile model.
//!
//! The profile is one record, not a collection, so it does not implement
//! [`Entity`](super::Entity).

use super::validation::{currency_code, optional_email, require_non_blank, ValidationError};
use super::{double_option, merge, EntityId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Owner,
    Admin,
    Staff,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
    pub role: UserRole,
    /// Currency code used for reports and new documents.
    pub base_currency: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub business_name: Option<Option<String>>,
    pub role: Option<UserRole>,
    pub base_currency: Option<String>,
}

impl User {
    /// Default profile written when no profile is stored.
    pub fn seed(now: Timestamp) -> Self {
        Self {
            id: "1".to_string(),
            name: "Business Owner".to_string(),
            email: None,
            phone: None,
            business_name: Some("My Business".to_string()),
            role: UserRole::Owner,
            base_currency: "USD".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_patch(&mut self, patch: UserPatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.email, patch.email);
        merge(&mut self.phone, patch.phone);
        merge(&mut self.business_name, patch.business_name);
        merge(&mut self.role, patch.role);
        merge(&mut self.base_currency, patch.base_currency);
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)?;
        optional_email("email", self.email.as_deref())?;
        currency_code("baseCurrency", &self.base_currency)?;
        if self.updated_at < self.created_at {
            return Err(ValidationError::new(
                "updatedAt",
                "must not be earlier than createdAt",
            ));
        }
        Ok(())
    }
}
