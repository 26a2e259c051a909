//! LeadFlow gateway: the HTTP surface and the assistant-run
//! orchestrator that drive the lead-management workflow.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod runtime;
pub mod state;
