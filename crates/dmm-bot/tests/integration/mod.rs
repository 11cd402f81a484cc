//! Integration tests for dmm-bot.
//!
//! Drive full cycles and the worker loop against the in-memory venue:
//! - Quote lifecycle across cycles (place, edit, withdraw)
//! - Edit fallback and error classification
//! - Worker stop and fatal handling

pub mod common;
