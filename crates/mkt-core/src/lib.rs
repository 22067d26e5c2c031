//! Core domain + application logic for the marketplace bot.
//!
//! This crate is intentionally framework-agnostic. Discord / JSONBin live
//! behind ports (traits) implemented in adapter crates; everything with real
//! invariants (catalog indices, removal resolution, the negotiation-channel
//! state machine and its reminder timers) lives here.

pub mod access;
pub mod catalog;
pub mod command;
pub mod config;
pub mod domain;
pub mod errors;
pub mod interaction;
pub mod logging;
pub mod pagination;
pub mod ports;
pub mod reminders;
pub mod removal;
pub mod settings;
pub mod store;
pub mod ticket;
pub mod view;

pub use errors::{Error, Result};
