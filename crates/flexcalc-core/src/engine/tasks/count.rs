use crate::core::io::trajectory::FrameSource;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::io::{BufRead, Seek};
use tracing::{info, instrument};

/// Counts the frames of the trajectory by scanning for header lines.
///
/// An empty trajectory is an error rather than a count of zero: every later pass divides
/// by this number.
#[instrument(skip_all, name = "frame_count_task")]
pub fn run<R: BufRead + Seek>(
    source: &mut FrameSource<R>,
    reporter: &ProgressReporter,
) -> Result<usize, EngineError> {
    reporter.report(Progress::PassStart {
        name: "Counting frames",
    });

    source.rewind()?;
    let frame_count = source.count_headers()?;
    if frame_count == 0 {
        return Err(EngineError::EmptyTrajectory {
            marker: source.marker(),
        });
    }

    info!(frame_count, "Frame count complete.");
    reporter.report(Progress::PassFinish);
    Ok(frame_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tasks::test_utils::source;

    #[test]
    fn counts_every_header_line() {
        let mut src = source(">a\n1 2 3\n>b\n1 2 3\n>c\n1 2 3\n");
        assert_eq!(run(&mut src, &ProgressReporter::new()).unwrap(), 3);
    }

    #[test]
    fn counting_twice_gives_the_same_result() {
        let mut src = source(">a\n1 2 3\n>b\n1 2 3\n");
        let reporter = ProgressReporter::new();
        assert_eq!(run(&mut src, &reporter).unwrap(), 2);
        assert_eq!(run(&mut src, &reporter).unwrap(), 2);
    }

    #[test]
    fn empty_trajectory_is_an_error() {
        let mut src = source("");
        assert!(matches!(
            run(&mut src, &ProgressReporter::new()),
            Err(EngineError::EmptyTrajectory { marker: '>' })
        ));

        let mut src = source("1 2 3\n4 5 6\n");
        assert!(matches!(
            run(&mut src, &ProgressReporter::new()),
            Err(EngineError::EmptyTrajectory { .. })
        ));
    }
}
