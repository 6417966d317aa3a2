//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own connection lifetimes for operations that span several statements.

pub mod transaction_service;
