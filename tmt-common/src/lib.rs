//! # TomatoMato Common Library
//!
//! Shared code for the crop health services including:
//! - Decision fusion of classifier confidences
//! - Soil and environment readings
//! - Disease class catalogue
//! - Configuration loading

pub mod classes;
pub mod config;
pub mod error;
pub mod fusion;
pub mod soil;

pub use error::{Error, Result};
pub use fusion::{fuse_predictions, FusionResult, HealthStatus};
pub use soil::SoilReading;
