//! Shared types for GitHub Archive activity analytics.
//!
//! Holds the event data model, the error taxonomy, CLI settings, strict
//! timestamp handling and report text formatting.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{ActivityError, Result};
