use crate::core::io::trajectory::TrajectoryError;
use crate::core::models::frame::FrameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Trajectory contains no frames (no header lines starting with '{marker}')")]
    EmptyTrajectory { marker: char },

    #[error("Failed to read trajectory: {source}")]
    Trajectory {
        #[from]
        source: TrajectoryError,
    },

    #[error("Atom count mismatch in frame '{header}': expected {expected} atoms, found {found}")]
    AtomCountMismatch {
        header: String,
        expected: usize,
        found: usize,
    },

    #[error("Reference frame '{header}' contains no atoms")]
    EmptyFrame { header: String },

    #[error("Memory exhausted: {source}")]
    Frame {
        #[from]
        source: FrameError,
    },

    #[error("Analysis already failed; the driver cannot advance")]
    DriverFailed,
}

impl EngineError {
    pub(crate) fn mismatch(header: &str, expected: usize, found: usize) -> Self {
        Self::AtomCountMismatch {
            header: header.to_string(),
            expected,
            found,
        }
    }
}
