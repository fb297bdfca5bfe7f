use crate::core::models::frame::Frame;

/// The trajectory frame with the lowest RMSD to the mean frame.
///
/// Owns its frame outright, so it outlives the pass that found it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosestFrame {
    /// 1-based position of the frame in the trajectory.
    pub index: usize,
    pub frame: Frame,
    pub rmsd_to_mean: f64,
}
