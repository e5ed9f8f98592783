//! Core use-case services.
//!
//! # Responsibility
//! - Bundle per-entity repositories over one injected store handle.
//! - Keep FFI/CLI layers decoupled from storage keys.

pub mod data_service;
