//! # goalbot-channels
//!
//! Messaging gateway clients for goalbot.

pub mod telegram;
pub mod utils;
