//! Simulation reports.
//!
//! A report captures per-peer finish rounds, aggregate completion statistics
//! and the topology a run was executed on, for humans (text) and tools (JSON).

pub mod types;
pub mod render;

pub use types::*;
pub use render::{generate_json_report, generate_text_report, print_summary, render_text_report};
