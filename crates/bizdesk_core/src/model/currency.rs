//! Currency record model.
//!
//! # Invariants
//! - `code` is an ISO-4217 style three-letter uppercase code.
//! - `exchange_rate` is relative to the default currency and always `> 0`.
//! - At most one currency carries `is_default = true` (kept by the repository).

use super::validation::{currency_code, require_non_blank, ValidationError};
use super::{merge, present, Entity, EntityId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub id: EntityId,
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub exchange_rate: f64,
    pub is_default: bool,
    pub status: CurrencyStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyDraft {
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub exchange_rate: f64,
    pub status: CurrencyStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurrencyPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub exchange_rate: Option<f64>,
    pub status: Option<CurrencyStatus>,
}

impl Entity for Currency {
    type Draft = CurrencyDraft;
    type Patch = CurrencyPatch;
    type Status = CurrencyStatus;

    const COLLECTION_KEY: &'static str = "currencies";
    const COUNTER_KEY: &'static str = "currencies:last_id";

    fn from_draft(id: EntityId, draft: CurrencyDraft, now: Timestamp) -> Self {
        Self {
            id,
            code: draft.code,
            name: draft.name,
            symbol: draft.symbol,
            exchange_rate: draft.exchange_rate,
            is_default: false,
            status: draft.status,
            created_at: now,
            updated_at: now,
        }
    }

    // `is_default` only changes through `set_default`, which sees the whole
    // collection.
    fn apply_patch(&mut self, patch: CurrencyPatch) {
        merge(&mut self.code, patch.code);
        merge(&mut self.name, patch.name);
        merge(&mut self.symbol, patch.symbol);
        merge(&mut self.exchange_rate, patch.exchange_rate);
        merge(&mut self.status, patch.status);
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

    fn status(&self) -> CurrencyStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        present([
            Some(self.code.as_str()),
            Some(self.name.as_str()),
            Some(self.symbol.as_str()),
        ])
    }

    fn validate(&self) -> Result<(), ValidationError> {
        currency_code("code", &self.code)?;
        require_non_blank("name", &self.name)?;
        require_non_blank("symbol", &self.symbol)?;
        if !self.exchange_rate.is_finite() || self.exchange_rate <= 0.0 {
            return Err(ValidationError::new(
                "exchangeRate",
                format!("must be a finite rate > 0, got {}", self.exchange_rate),
            ));
        }
        Ok(())
    }

    fn seed(now: Timestamp) -> Vec<Self> {
        let currency = |id: &str, code: &str, name: &str, symbol: &str, rate: f64| Currency {
            id: id.to_string(),
            code: code.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            exchange_rate: rate,
            is_default: id == "1",
            status: CurrencyStatus::Active,
            created_at: now,
            updated_at: now,
        };
        vec![
            currency("1", "USD", "US Dollar", "$", 1.0),
            currency("2", "EUR", "Euro", "€", 0.92),
            currency("3", "GBP", "British Pound", "£", 0.79),
        ]
    }
}
