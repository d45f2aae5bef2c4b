//! Core domain + forwarding logic for the Telegram log forwarder.
//!
//! This crate is intentionally framework-agnostic. Telegram and the host
//! logging framework live behind ports (traits) implemented in adapter
//! crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod i18n;
pub mod sink;

pub use errors::{Error, Result};
