//! ABC notation analysis, scoring, and publication gating.
//!
//! This crate parses ABC excerpts, extracts melodic features, scores them
//! for playability and learning value against an instrument profile, and
//! decides whether generated teaching material may be published.

pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod gate;
pub mod instruments;
pub mod model;
pub mod notation;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod statistics;
pub mod traits;
