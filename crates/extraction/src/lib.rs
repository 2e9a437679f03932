//! Lead-information extraction pipeline
//!
//! Best-effort, rule-based extraction of structured contact data (email,
//! phone, name) from unstructured multi-turn conversation text:
//! - Layered pattern extractors with fallback chains (email, phone)
//! - Context-sensitive name extraction (trusts a bare name only when the
//!   assistant just asked for one)
//! - Keyword trigger heuristic gating whether extraction runs at all
//! - Candidate lead assembly over the full transcript
//!
//! Everything in this crate is pure and synchronous. Extraction failures
//! are treated as "field not found" and never surface to the caller.

pub mod assembler;
pub mod name;
pub mod patterns;
pub mod trigger;

pub use assembler::assemble_candidate;
pub use name::{extract_name, parse_name_from_response};
pub use patterns::{extract_email, extract_phone};
pub use trigger::should_attempt_capture;
