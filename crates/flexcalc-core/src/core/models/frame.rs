use crate::core::utils::geometry;
use nalgebra::Point3;
use thiserror::Error;

/// Header used for synthetic frames that are not part of the trajectory.
pub const MEAN_FRAME_HEADER: &str = "mean";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Failed to allocate storage for a frame of {atoms} atoms")]
    Allocation { atoms: usize },
}

/// One time-sample of a trajectory: a header label plus ordered atom positions.
///
/// Frames are read-only once built. Use [`FrameBuilder`] to assemble one atom at a time,
/// or [`Frame::zeroed`] for an accumulator of known size.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    header: String,
    positions: Vec<Point3<f64>>,
}

impl Frame {
    pub fn new(header: impl Into<String>, positions: Vec<Point3<f64>>) -> Self {
        Self {
            header: header.into(),
            positions,
        }
    }

    /// Allocates a frame of `atoms` positions, all at the origin.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Allocation`] if the position buffer cannot be reserved.
    pub fn zeroed(header: impl Into<String>, atoms: usize) -> Result<Self, FrameError> {
        let mut positions = Vec::new();
        positions
            .try_reserve_exact(atoms)
            .map_err(|_| FrameError::Allocation { atoms })?;
        positions.resize(atoms, Point3::origin());
        Ok(Self::new(header, positions))
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn atom_count(&self) -> usize {
        self.positions.len()
    }

    pub(crate) fn positions_mut(&mut self) -> &mut [Point3<f64>] {
        &mut self.positions
    }

    /// RMSD between this frame and `other`, or `None` when the atom counts differ or
    /// both frames are empty.
    pub fn rmsd_to(&self, other: &Frame) -> Option<f64> {
        geometry::calculate_rmsd(&self.positions, &other.positions)
    }
}

/// Assembles a [`Frame`] position by position with fallible growth.
///
/// Dropping a builder after an error discards everything collected so far.
#[derive(Debug)]
pub struct FrameBuilder {
    header: String,
    positions: Vec<Point3<f64>>,
}

impl FrameBuilder {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            positions: Vec::new(),
        }
    }

    /// Reserves room for `atoms` positions up front, typically the atom count of the
    /// previously parsed frame.
    pub fn with_capacity(header: impl Into<String>, atoms: usize) -> Result<Self, FrameError> {
        let mut builder = Self::new(header);
        builder
            .positions
            .try_reserve_exact(atoms)
            .map_err(|_| FrameError::Allocation { atoms })?;
        Ok(builder)
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn push(&mut self, position: Point3<f64>) -> Result<(), FrameError> {
        self.positions
            .try_reserve(1)
            .map_err(|_| FrameError::Allocation {
                atoms: self.positions.len() + 1,
            })?;
        self.positions.push(position);
        Ok(())
    }

    pub fn build(self) -> Frame {
        Frame {
            header: self.header,
            positions: self.positions,
        }
    }
}
