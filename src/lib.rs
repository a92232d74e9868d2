//! Terminal chat client for the consular assistant service.
//!
//! Questions go through a single-flight [`chat::SubmissionController`]: the
//! user entry and an assistant placeholder are appended to the
//! [`chat::Transcript`] at once, and the placeholder is rewritten exactly once
//! when the `/ask` call settles.

pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod logging;
pub mod oneshot;
pub mod tui;
