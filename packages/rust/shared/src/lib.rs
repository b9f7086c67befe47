//! Shared types, error model, and configuration for rigmate.
//!
//! This crate is the foundation depended on by all other rigmate crates.
//! It provides:
//! - [`RigmateError`], the unified error type
//! - Domain types ([`Component`], [`RawListing`], [`BuildRecommendation`],
//!   [`ComponentType`], [`Verdict`], ...)
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, AssemblyConfig, DefaultsConfig, RatesConfig, WeightsConfig, config_dir,
    config_file_path, expand_home, init_config, load_config, load_config_from,
};
pub use error::{Result, RigmateError};
pub use types::{
    BuildCompat, BuildRecommendation, Component, ComponentId, ComponentType, Condition,
    RawListing, Scores, SpecValue, Specs, UseCase, Verdict, WeightVector, allowed_keys, spec_keys,
};
