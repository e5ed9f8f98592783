//! Account group (chart-of-accounts heading) record model.
//!
//! # Invariants
//! - A group never lists itself as its own parent.
//! - Parent links are not checked for existence; deleting a parent leaves
//!   children pointing at a missing id.

use super::validation::{require_non_blank, ValidationError};
use super::{double_option, merge, present, Entity, EntityId, Timestamp};
use serde::{Deserialize, Serialize};

/// Accounting nature of the group. Doubles as the search filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountNature {
    #[default]
    Assets,
    Liabilities,
    Equity,
    Income,
    Expenses,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountGroup {
    pub id: EntityId,
    pub name: String,
    /// Short ledger code, e.g. "CA".
    #[serde(default)]
    pub code: Option<String>,
    pub nature: AccountNature,
    #[serde(default)]
    pub parent_id: Option<EntityId>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountGroupDraft {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    pub nature: AccountNature,
    #[serde(default)]
    pub parent_id: Option<EntityId>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountGroupPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub code: Option<Option<String>>,
    pub nature: Option<AccountNature>,
    #[serde(deserialize_with = "double_option")]
    pub parent_id: Option<Option<EntityId>>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl Entity for AccountGroup {
    type Draft = AccountGroupDraft;
    type Patch = AccountGroupPatch;
    type Status = AccountNature;

    const COLLECTION_KEY: &'static str = "account_groups";
    const COUNTER_KEY: &'static str = "account_groups:last_id";

    fn from_draft(id: EntityId, draft: AccountGroupDraft, now: Timestamp) -> Self {
        Self {
            id,
            name: draft.name,
            code: draft.code,
            nature: draft.nature,
            parent_id: draft.parent_id,
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: AccountGroupPatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.code, patch.code);
        merge(&mut self.nature, patch.nature);
        merge(&mut self.parent_id, patch.parent_id);
        merge(&mut self.description, patch.description);
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: Timestamp) {
        self.updated_at = at;
    }

    fn status(&self) -> AccountNature {
        self.nature
    }

    fn search_fields(&self) -> Vec<&str> {
        present([
            Some(self.name.as_str()),
            self.code.as_deref(),
            self.description.as_deref(),
        ])
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)?;
        if self.parent_id.as_deref() == Some(self.id.as_str()) {
            return Err(ValidationError::new(
                "parentId",
                "an account group cannot be its own parent",
            ));
        }
        Ok(())
    }

    fn seed(now: Timestamp) -> Vec<Self> {
        let group = |id: &str, name: &str, code: &str, nature| AccountGroup {
            id: id.to_string(),
            name: name.to_string(),
            code: Some(code.to_string()),
            nature,
            parent_id: None,
            description: None,
            created_at: now,
            updated_at: now,
        };
        vec![
            group("1", "Current Assets", "CA", AccountNature::Assets),
            group("2", "Current Liabilities", "CL", AccountNature::Liabilities),
            group("3", "Direct Expenses", "DE", AccountNature::Expenses),
        ]
    }
}
