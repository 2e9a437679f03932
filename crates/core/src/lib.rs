//! Core types and traits for the chat widget backend
//!
//! This crate provides foundational types used across all other crates:
//! - Conversation types (turns, roles)
//! - Candidate lead record produced by extraction
//! - Collaborator traits for pluggable backends (retrieval, completion)
//! - Error types

pub mod conversation;
pub mod error;
pub mod lead;
pub mod traits;

pub use conversation::{Turn, TurnRole};
pub use error::{Error, Result};
pub use lead::CandidateLead;
pub use traits::{LanguageModel, Retriever, Snippet};
