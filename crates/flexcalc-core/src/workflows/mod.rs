//! # Workflows Module
//!
//! High-level entry points that sequence the engine passes into a complete analysis.
//!
//! - **Flexibility Workflow** ([`flexibility`]) - Count, mean frame, closest frame and RMSD
//!   average over a single rewindable trajectory stream.

pub mod flexibility;
