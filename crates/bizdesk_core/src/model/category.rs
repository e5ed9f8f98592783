//! Category record model used to classify income, expenses and products.

use super::validation::{optional_hex_color, require_non_blank, ValidationError};
use super::{double_option, merge, present, Entity, EntityId, Timestamp};
use serde::{Deserialize, Serialize};

/// What a category classifies. Doubles as the search filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Income,
    #[default]
    Expense,
    Product,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    pub kind: CategoryKind,
    #[serde(default)]
    pub description: Option<String>,
    /// Display color as `#RRGGBB`.
    #[serde(default)]
    pub color: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub name: String,
    pub kind: CategoryKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub kind: Option<CategoryKind>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub color: Option<Option<String>>,
}

impl Entity for Category {
    type Draft = CategoryDraft;
    type Patch = CategoryPatch;
    type Status = CategoryKind;

    const COLLECTION_KEY: &'static str = "categories";
    const COUNTER_KEY: &'static str = "categories:last_id";

    fn from_draft(id: EntityId, draft: CategoryDraft, now: Timestamp) -> Self {
        Self {
            id,
            name: draft.name,
            kind: draft.kind,
            description: draft.description,
            color: draft.color,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: CategoryPatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.kind, patch.kind);
        merge(&mut self.description, patch.description);
        merge(&mut self.color, patch.color);
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

    fn status(&self) -> CategoryKind {
        self.kind
    }

    fn search_fields(&self) -> Vec<&str> {
        present([Some(self.name.as_str()), self.description.as_deref()])
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)?;
        optional_hex_color("color", self.color.as_deref())?;
        Ok(())
    }

    fn seed(now: Timestamp) -> Vec<Self> {
        let category = |id: &str, name: &str, kind, description: &str, color: &str| Category {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            description: Some(description.to_string()),
            color: Some(color.to_string()),
            created_at: now,
            updated_at: now,
        };
        vec![
            category("1", "Sales", CategoryKind::Income, "Revenue from sales", "#2E7D32"),
            category(
                "2",
                "Office Expenses",
                CategoryKind::Expense,
                "Rent, utilities and supplies",
                "#C62828",
            ),
            category(
                "3",
                "Electronics",
                CategoryKind::Product,
                "Devices and accessories",
                "#1565C0",
            ),
        ]
    }
}
