//! Shared types for all LeadFlow crates: the pipeline stage machine,
//! tool-call protocol types, the lead model, configuration, and the
//! common error enum.

pub mod config;
pub mod error;
pub mod lead;
pub mod stage;
pub mod tool;

pub use error::{Error, Result};
