use crate::core::io::trajectory::FrameSource;
use crate::core::models::frame::Frame;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::io::{BufRead, Seek};
use tracing::{info, instrument, warn};

/// Averages the RMSD of every frame against `reference` over `frame_count` frames.
#[instrument(skip_all, name = "rmsd_average_task")]
pub fn run<R: BufRead + Seek>(
    source: &mut FrameSource<R>,
    reference: &Frame,
    frame_count: usize,
    reporter: &ProgressReporter,
) -> Result<f64, EngineError> {
    reporter.report(Progress::PassStart {
        name: "Averaging RMSD",
    });
    if frame_count == 0 {
        return Err(EngineError::EmptyTrajectory {
            marker: source.marker(),
        });
    }

    source.rewind()?;
    reporter.report(Progress::TaskStart {
        total_steps: frame_count as u64,
    });

    let mut rmsd_sum = 0.0;
    let mut frames_seen = 0usize;
    for frame in source.frames() {
        let frame = frame?;
        rmsd_sum += reference.rmsd_to(&frame).ok_or_else(|| {
            EngineError::mismatch(frame.header(), reference.atom_count(), frame.atom_count())
        })?;
        frames_seen += 1;
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    if frames_seen != frame_count {
        warn!(
            frames_seen,
            frame_count, "Number of frames read differs from the counted frames."
        );
        reporter.report(Progress::Message(format!(
            "Read {} frames, expected {}",
            frames_seen, frame_count
        )));
    }

    let mean_rmsd = rmsd_sum / frame_count as f64;
    info!(mean_rmsd, "Mean RMSD computed.");
    reporter.report(Progress::PassFinish);
    Ok(mean_rmsd)
}
