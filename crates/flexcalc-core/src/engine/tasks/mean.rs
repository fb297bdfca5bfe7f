use crate::core::io::trajectory::FrameSource;
use crate::core::models::frame::{Frame, MEAN_FRAME_HEADER};
use crate::core::utils::geometry;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::io::{BufRead, Seek};
use tracing::{debug, info, instrument};

/// Builds the synthetic mean frame: per-atom arithmetic mean over all `frame_count` frames.
///
/// The first frame fixes the reference atom count; the stream is then rewound and every
/// frame, the first included, contributes `position / frame_count` to the accumulator.
#[instrument(skip_all, name = "mean_frame_task", fields(frame_count = frame_count))]
pub fn run<R: BufRead + Seek>(
    source: &mut FrameSource<R>,
    frame_count: usize,
    reporter: &ProgressReporter,
) -> Result<Frame, EngineError> {
    reporter.report(Progress::PassStart {
        name: "Computing mean frame",
    });
    if frame_count == 0 {
        return Err(EngineError::EmptyTrajectory {
            marker: source.marker(),
        });
    }

    source.rewind()?;
    let atom_count = match source.next_frame()? {
        Some(reference) if reference.atom_count() == 0 => {
            return Err(EngineError::EmptyFrame {
                header: reference.header().to_string(),
            });
        }
        Some(reference) => {
            debug!(
                header = reference.header(),
                atom_count = reference.atom_count(),
                "Reference atom count established."
            );
            reference.atom_count()
        }
        None => {
            return Err(EngineError::EmptyTrajectory {
                marker: source.marker(),
            });
        }
    };

    let mut mean = Frame::zeroed(MEAN_FRAME_HEADER, atom_count)?;
    let divisor = frame_count as f64;

    source.rewind()?;
    reporter.report(Progress::TaskStart {
        total_steps: frame_count as u64,
    });
    for frame in source.frames() {
        let frame = frame?;
        if !geometry::accumulate_scaled(mean.positions_mut(), frame.positions(), divisor) {
            return Err(EngineError::mismatch(
                frame.header(),
                atom_count,
                frame.atom_count(),
            ));
        }
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    info!(atom_count, "Mean frame computed.");
    reporter.report(Progress::PassFinish);
    Ok(mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tasks::test_utils::{f64_approx_equal, source};
    use nalgebra::Point3;

    fn mean_of(text: &str, frame_count: usize) -> Result<Frame, EngineError> {
        run(&mut source(text), frame_count, &ProgressReporter::new())
    }

    #[test]
    fn computes_per_atom_mean() {
        let mean = mean_of(">a\n0 0 0\n1 1 1\n>b\n2 0 0\n3 3 -1\n", 2).unwrap();
        assert_eq!(mean.header(), MEAN_FRAME_HEADER);
        assert_eq!(
            mean.positions(),
            &[Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 2.0, 0.0)]
        );
    }

    #[test]
    fn mean_is_independent_of_frame_order() {
        let frames = [
            ">f1\n0.1 2.7 -3.3\n1e3 -1e3 5\n",
            ">f2\n7.25 -0.5 9.9\n999.5 -1000.25 4\n",
            ">f3\n-4.4 1.1 0.0\n1000.75 -999.5 6.5\n",
        ];
        let forward = mean_of(&frames.concat(), 3).unwrap();
        let reversed: String = frames.iter().rev().copied().collect();
        let backward = mean_of(&reversed, 3).unwrap();

        let expected = [
            Point3::new((0.1 + 7.25 - 4.4) / 3.0, (2.7 - 0.5 + 1.1) / 3.0, (-3.3 + 9.9) / 3.0),
            Point3::new(
                (1000.0 + 999.5 + 1000.75) / 3.0,
                (-1000.0 - 1000.25 - 999.5) / 3.0,
                (5.0 + 4.0 + 6.5) / 3.0,
            ),
        ];
        for result in [&forward, &backward] {
            for (got, want) in result.positions().iter().zip(expected.iter()) {
                assert!(f64_approx_equal(got.x, want.x));
                assert!(f64_approx_equal(got.y, want.y));
                assert!(f64_approx_equal(got.z, want.z));
            }
        }
    }

    #[test]
    fn large_magnitudes_do_not_overflow() {
        let big = f64::MAX / 2.0;
        let text = format!(">a\n{big:e} 0 0\n>b\n{big:e} 0 0\n>c\n{big:e} 0 0\n");
        let mean = mean_of(&text, 3).unwrap();
        assert!(mean.positions()[0].x.is_finite());
        assert!(f64_approx_equal(mean.positions()[0].x, big));
    }

    #[test]
    fn mismatched_frame_is_rejected_by_header() {
        let err = mean_of(">a\n0 0 0\n1 1 1\n>b\n2 2 2\n", 2).unwrap_err();
        match err {
            EngineError::AtomCountMismatch {
                header,
                expected,
                found,
            } => {
                assert_eq!(header, "b");
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_reference_frame_is_rejected() {
        let err = mean_of(">nothing\n>b\n1 2 3\n", 2).unwrap_err();
        assert!(matches!(err, EngineError::EmptyFrame { header } if header == "nothing"));
    }

    #[test]
    fn parse_errors_abort_the_pass() {
        let err = mean_of(">a\n1 2 3\n>b\n1 2 x\n", 2).unwrap_err();
        assert!(matches!(err, EngineError::Trajectory { .. }));
    }
}
