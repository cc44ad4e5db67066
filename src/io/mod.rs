//! Input/output helpers.
//!
//! - CSV batch ingest + estimation (`batch`)
//! - result exports (CSV) (`export`)

pub mod batch;
pub mod export;

pub use batch::*;
pub use export::*;
