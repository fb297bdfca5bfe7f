//! One module per full forward pass over the trajectory.
//!
//! Every task rewinds the source before it starts reading, so tasks can run in any order
//! the driver needs and re-running one never depends on where a previous pass stopped.

pub mod average;
pub mod closest;
pub mod count;
pub mod mean;
