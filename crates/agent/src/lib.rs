//! Chat agent for the widget backend
//!
//! Ties the per-turn pipeline together:
//! - Knowledge retrieval for the latest user message
//! - System prompt assembly from the tenant profile
//! - Reply generation via the completion backend
//! - Best-effort lead capture when the turn looks commercial
//! - Append-only turn analytics
//!
//! Lead capture and analytics are side channels: their failures are logged
//! and swallowed, never surfaced to the visitor. Only retrieval and
//! completion failures reach the visitor, and then only as a fixed
//! apologetic fallback reply.

pub mod engine;
pub mod lead_capture;

pub use engine::{ChatEngine, ChatEngineConfig, TurnOutcome};
pub use lead_capture::{CaptureOutcome, LeadCaptureService};
