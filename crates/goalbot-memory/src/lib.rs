//! # goalbot-memory
//!
//! Persistent storage for goalbot (SQLite-backed): chat identities and the
//! goal-tracker tables the bot reads and writes.

pub mod store;

pub use store::Store;
