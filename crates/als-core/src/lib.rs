//! Core domain + application logic for the AI literature scanner.
//!
//! This crate is intentionally framework-agnostic. Feed fetching, the language
//! model and Telegram live behind ports (traits) implemented in adapter crates.

pub mod aggregator;
pub mod config;
pub mod diagnostics;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod pipeline;
pub mod ports;
pub mod report;
pub mod scheduler;
pub mod sources;
pub mod summarizer;

#[cfg(test)]
mod test_support;

pub use errors::{Error, Result};
