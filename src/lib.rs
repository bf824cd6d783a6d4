#![forbid(unsafe_code)]

//! Issue tracker web service with a pattern-matching chat assistant.

pub mod chat;
pub mod config;
pub mod errors;
pub mod http;
pub mod models;
pub mod persistence;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
