//! `house-price` library crate.
//!
//! The binary (`hp`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the pipeline can sit behind other front-ends (batch jobs, services)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod input;
pub mod io;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod tui;
