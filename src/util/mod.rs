//! Utility modules: transport retry and log redaction.

pub mod redact;
pub mod retry;
