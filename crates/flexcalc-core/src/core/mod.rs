//! # Core Module
//!
//! Stateless building blocks shared by every pass over a trajectory.
//!
//! - **Frame Representation** ([`models`]) - The [`Frame`](models::frame::Frame) type and its
//!   fallible builder.
//! - **Trajectory I/O** ([`io`]) - Line-oriented parsing of header-delimited trajectories with a
//!   single line of lookahead, plus a matching writer.
//! - **Geometry** ([`utils`]) - RMSD and scaled coordinate accumulation.

pub mod io;
pub mod models;
pub mod utils;
