//! Riverwatch Library
//!
//! This module exposes the fetch pipelines, the dashboard state and the
//! renderers for use by the binary and in integration tests.

pub mod cli;
pub mod dashboard;
pub mod data;
pub mod logging;
pub mod panic_hook;
pub mod refresh;
pub mod report;
pub mod ui;
