//! # Vision Bridge Common Library
//!
//! Shared code for the Vision Bridge crates:
//! - Error types
//! - Configuration loading and credential resolution
//! - OCR polling policy

pub mod config;
pub mod error;

pub use error::{Error, Result};
