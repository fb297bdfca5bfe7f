//! Provides input/output functionality for header-delimited trajectory files.
//!
//! A trajectory is never materialized; [`trajectory::FrameSource`] yields one frame at a
//! time and can be rewound to start another pass.

pub mod trajectory;
