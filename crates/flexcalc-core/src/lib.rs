//! # flexcalc Core Library
//!
//! Computes a single flexibility score for a molecular-dynamics trajectory: the mean,
//! over all frames, of the RMSD between each frame and the frame structurally closest
//! to the coordinate-wise mean of the whole trajectory.
//!
//! The library never buffers the trajectory. Every stage is a full forward scan over a
//! rewindable input stream, so peak memory is proportional to the atom count of a
//! single frame, independent of trajectory length.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** The immutable [`Frame`](core::models::frame::Frame)
//!   model, the streaming [`FrameSource`](core::io::trajectory::FrameSource) parser and
//!   the RMSD geometry primitives.
//!
//! - **[`engine`]: The Passes.** Configuration, error types, progress reporting and one
//!   task per scan over the trajectory (count, mean, closest frame, RMSD average).
//!
//! - **[`workflows`]: The Public API.** The driver state machine that sequences the
//!   passes and produces a [`FlexibilityResult`](workflows::flexibility::FlexibilityResult).

pub mod core;
pub mod engine;
pub mod workflows;
