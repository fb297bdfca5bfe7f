use crate::core::io::trajectory::FrameSource;
use crate::core::models::frame::Frame;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::ClosestFrame;
use std::io::{BufRead, Seek};
use tracing::{info, instrument, trace};

/// Finds the real frame with minimum RMSD to `mean`.
///
/// Ties keep the earliest frame: a later frame only replaces the current best when its
/// RMSD is strictly lower.
#[instrument(skip_all, name = "closest_frame_task")]
pub fn run<R: BufRead + Seek>(
    source: &mut FrameSource<R>,
    mean: &Frame,
    frame_count: usize,
    reporter: &ProgressReporter,
) -> Result<ClosestFrame, EngineError> {
    reporter.report(Progress::PassStart {
        name: "Finding closest frame",
    });

    source.rewind()?;
    reporter.report(Progress::TaskStart {
        total_steps: frame_count as u64,
    });

    let mut best: Option<ClosestFrame> = None;
    for (i, frame) in source.frames().enumerate() {
        let frame = frame?;
        let rmsd = frame.rmsd_to(mean).ok_or_else(|| {
            EngineError::mismatch(frame.header(), mean.atom_count(), frame.atom_count())
        })?;

        let improves = match &best {
            None => true,
            Some(current) => rmsd < current.rmsd_to_mean,
        };
        if improves {
            trace!(index = i + 1, header = frame.header(), rmsd, "New closest frame.");
            best = Some(ClosestFrame {
                index: i + 1,
                frame,
                rmsd_to_mean: rmsd,
            });
        }
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    let closest = best.ok_or(EngineError::EmptyTrajectory {
        marker: source.marker(),
    })?;
    info!(
        index = closest.index,
        header = closest.frame.header(),
        rmsd_to_mean = closest.rmsd_to_mean,
        "Closest frame to the mean found."
    );
    reporter.report(Progress::PassFinish);
    Ok(closest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tasks::test_utils::source;
    use nalgebra::Point3;

    fn mean_at(x: f64) -> Frame {
        Frame::new("mean", vec![Point3::new(x, 0.0, 0.0)])
    }

    #[test]
    fn picks_frame_with_lowest_rmsd() {
        let mut src = source(">a\n0 0 0\n>b\n3 0 0\n>c\n6 0 0\n");
        let closest = run(&mut src, &mean_at(3.0), 3, &ProgressReporter::new()).unwrap();
        assert_eq!(closest.index, 2);
        assert_eq!(closest.frame.header(), "b");
        assert_eq!(closest.rmsd_to_mean, 0.0);
    }

    #[test]
    fn ties_keep_the_first_frame() {
        let mut src = source(">first\n0 0 0\n>second\n2 0 0\n");
        let closest = run(&mut src, &mean_at(1.0), 2, &ProgressReporter::new()).unwrap();
        assert_eq!(closest.index, 1);
        assert_eq!(closest.frame.header(), "first");
        assert_eq!(closest.rmsd_to_mean, 1.0);
    }

    #[test]
    fn later_strictly_closer_frame_replaces_best() {
        let mut src = source(">a\n5 0 0\n>b\n2 0 0\n>c\n2 0 0\n>d\n-2 0 0\n");
        let closest = run(&mut src, &mean_at(1.0), 4, &ProgressReporter::new()).unwrap();
        assert_eq!(closest.frame.header(), "b");
        assert_eq!(closest.frame.positions(), &[Point3::new(2.0, 0.0, 0.0)]);
    }

    #[test]
    fn closest_frame_survives_rewinding_the_source() {
        let mut src = source(">a\n0 0 0\n>b\n3 0 0\n>c\n6 0 0\n");
        let closest = run(&mut src, &mean_at(3.0), 3, &ProgressReporter::new()).unwrap();
        src.rewind().unwrap();
        let first = src.next_frame().unwrap().unwrap();
        assert_eq!(first.header(), "a");
        assert_eq!(closest.frame.positions(), &[Point3::new(3.0, 0.0, 0.0)]);
    }

    #[test]
    fn mismatched_frame_is_rejected() {
        let mut src = source(">a\n0 0 0\n>b\n0 0 0\n1 1 1\n");
        let err = run(&mut src, &mean_at(0.0), 2, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::AtomCountMismatch { ref header, expected: 1, found: 2 } if header == "b"
        ));
    }
}
