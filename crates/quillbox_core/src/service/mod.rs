//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and credential calls into use-case level APIs.
//! - Keep request-handling layers decoupled from storage details.

pub mod account_service;
pub mod note_service;
