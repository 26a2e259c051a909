//! CRM store access — the trait every caller programs against plus the
//! REST adapter for the hosted CRM.

pub mod rest;
pub mod store;
pub mod token;

pub use rest::RestCrm;
pub use store::CrmStore;
pub use token::{CachedToken, StaticToken, TokenSource};
