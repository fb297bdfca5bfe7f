//! # Engine Module
//!
//! The stateful layer that turns a rewindable [`FrameSource`](crate::core::io::trajectory::FrameSource)
//! into a flexibility score.
//!
//! Every task in [`tasks`] is one full forward pass over the trajectory. Passes never keep a
//! frame from the stream beyond the iteration that produced it; anything that must survive
//! the pass (the mean frame, the closest frame) is an owned copy handed back to the caller.
//!
//! - **Configuration** ([`config`]) - Trajectory format settings.
//! - **Error Handling** ([`error`]) - Failures that abort the pipeline.
//! - **Progress Monitoring** ([`progress`]) - Pass and per-frame progress events.
//! - **Pass Results** ([`state`]) - Owned values that persist between passes.

pub mod config;
pub mod error;
pub mod progress;
pub mod state;
pub(crate) mod tasks;
