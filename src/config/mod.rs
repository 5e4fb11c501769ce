//! Configuration module for heartcheck
//!
//! This module handles:
//! - User-level configuration (~/.config/heartcheck/config.toml)
//! - Model path and training defaults
//! - Environment overrides

mod user_config;

pub use user_config::{
    ModelConfig, TrainDefaults, UserConfig, DEFAULT_MODEL_PATH, MODEL_PATH_ENV,
};
