//! Core of the status bot: the persisted status record and the command
//! dispatcher that mutates or reports it.
//!
//! This crate is framework-agnostic. Telegram and the HTTP dashboard live in
//! adapter crates and only reach the record through [`ports::StatusStore`].

pub mod audit;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod ports;
pub mod security;
pub mod store;

pub use errors::{Error, Result};
