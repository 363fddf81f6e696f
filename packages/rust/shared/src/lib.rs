//! Shared types, error model, and configuration for ShipQuote.
//!
//! This crate is the foundation depended on by all other ShipQuote crates.
//! It provides:
//! - [`ShipQuoteError`]: the unified error type
//! - Domain vocabulary ([`StepKey`], [`VehicleId`], [`LocationId`], [`RunningStatus`],
//!   [`TransportType`], [`ContactField`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FormConfigSection, SubmissionConfig, VinConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_endpoint,
};
pub use error::{Result, ShipQuoteError};
pub use types::{
    CANONICAL_STEP_ORDER, ContactField, LocationId, RunningStatus, StepKey, TransportType,
    VIN_LENGTH, VehicleId,
};
