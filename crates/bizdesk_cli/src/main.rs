//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `bizdesk_core` linkage.
//! - Print per-collection counts for a store file, or for a fresh in-memory
//!   store when no path is given.

use bizdesk_core::logging::init_logging_from_config;
use bizdesk_core::{BusinessDataService, CoreConfig, SqliteKvStore, SystemClock};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut config = CoreConfig::from_env();
    if let Some(path) = std::env::args().nth(1) {
        config.store_path = Some(PathBuf::from(path));
    }
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    println!("bizdesk_core ping={}", bizdesk_core::ping());
    println!("bizdesk_core version={}", bizdesk_core::core_version());

    match print_summary(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bizdesk_cli failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_summary(config: &CoreConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = match &config.store_path {
        Some(path) => SqliteKvStore::open(path)?,
        None => SqliteKvStore::open_in_memory()?,
    };
    let clock = SystemClock;
    let summary = BusinessDataService::new(&store, &clock).summary()?;

    println!(
        "store={}",
        config
            .store_path
            .as_ref()
            .map_or_else(|| ":memory:".to_string(), |path| path.display().to_string())
    );
    println!("customers={}", summary.customers);
    println!("vendors={}", summary.vendors);
    println!("products={}", summary.products);
    println!("currencies={}", summary.currencies);
    println!("categories={}", summary.categories);
    println!("account_groups={}", summary.account_groups);
    Ok(())
}
