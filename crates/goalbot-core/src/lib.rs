//! # goalbot-core
//!
//! Core types, collaborator traits, configuration, and error handling for the
//! goal-tracker chat bot.

pub mod config;
pub mod error;
pub mod message;
pub mod model;
pub mod traits;

pub use config::shellexpand;
