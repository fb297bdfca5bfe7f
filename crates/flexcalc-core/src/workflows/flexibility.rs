use crate::core::io::trajectory::FrameSource;
use crate::core::models::frame::Frame;
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::state::ClosestFrame;
use crate::engine::tasks;
use std::io::{BufRead, Seek};
use std::path::Path;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct FlexibilityResult {
    /// Mean RMSD of every frame against the closest-to-mean frame: the flexibility score.
    pub mean_rmsd: f64,
    pub frame_count: usize,
    pub atom_count: usize,
    pub mean: Frame,
    pub closest: ClosestFrame,
}

/// Progress of a [`Driver`] through the passes.
///
/// `Failed` is absorbing: once a pass fails, the driver never advances again.
#[derive(Debug)]
pub enum DriverState {
    Init,
    Counted {
        frame_count: usize,
    },
    MeanComputed {
        frame_count: usize,
        mean: Frame,
    },
    ClosestFound {
        frame_count: usize,
        mean: Frame,
        closest: ClosestFrame,
    },
    Done(FlexibilityResult),
    Failed,
}

impl DriverState {
    pub fn name(&self) -> &'static str {
        match self {
            DriverState::Init => "Init",
            DriverState::Counted { .. } => "Counted",
            DriverState::MeanComputed { .. } => "MeanComputed",
            DriverState::ClosestFound { .. } => "ClosestFound",
            DriverState::Done(_) => "Done",
            DriverState::Failed => "Failed",
        }
    }
}

/// Sequences the four passes over one rewindable source.
///
/// The mean and closest frames are owned by the driver state and only lent to the pass
/// that needs them.
pub struct Driver<'a, R> {
    source: &'a mut FrameSource<R>,
    reporter: &'a ProgressReporter<'a>,
    state: DriverState,
}

impl<'a, R: BufRead + Seek> Driver<'a, R> {
    pub fn new(source: &'a mut FrameSource<R>, reporter: &'a ProgressReporter<'a>) -> Self {
        Self {
            source,
            reporter,
            state: DriverState::Init,
        }
    }

    pub fn state(&self) -> &DriverState {
        &self.state
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, DriverState::Done(_))
    }

    /// Performs exactly one transition. Advancing a finished driver is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates the failing pass's error and moves the driver to [`DriverState::Failed`];
    /// every later call returns [`EngineError::DriverFailed`].
    pub fn advance(&mut self) -> Result<&DriverState, EngineError> {
        let current = std::mem::replace(&mut self.state, DriverState::Failed);
        let from = current.name();
        match self.transition(current) {
            Ok(next) => {
                debug!(from, to = next.name(), "Driver advanced.");
                self.state = next;
                Ok(&self.state)
            }
            Err(e) => {
                error!(from, error = %e, "Driver failed.");
                Err(e)
            }
        }
    }

    /// Advances until [`DriverState::Done`] and returns the result.
    pub fn run(mut self) -> Result<FlexibilityResult, EngineError> {
        while !self.is_done() {
            self.advance()?;
        }
        match self.state {
            DriverState::Done(result) => Ok(result),
            _ => Err(EngineError::DriverFailed),
        }
    }

    fn transition(&mut self, state: DriverState) -> Result<DriverState, EngineError> {
        let next = match state {
            DriverState::Init => DriverState::Counted {
                frame_count: tasks::count::run(self.source, self.reporter)?,
            },
            DriverState::Counted { frame_count } => DriverState::MeanComputed {
                frame_count,
                mean: tasks::mean::run(self.source, frame_count, self.reporter)?,
            },
            DriverState::MeanComputed { frame_count, mean } => {
                let closest = tasks::closest::run(self.source, &mean, frame_count, self.reporter)?;
                DriverState::ClosestFound {
                    frame_count,
                    mean,
                    closest,
                }
            }
            DriverState::ClosestFound {
                frame_count,
                mean,
                closest,
            } => {
                let mean_rmsd =
                    tasks::average::run(self.source, &closest.frame, frame_count, self.reporter)?;
                self.source.rewind()?;
                DriverState::Done(FlexibilityResult {
                    mean_rmsd,
                    frame_count,
                    atom_count: mean.atom_count(),
                    mean,
                    closest,
                })
            }
            DriverState::Done(result) => DriverState::Done(result),
            DriverState::Failed => return Err(EngineError::DriverFailed),
        };
        Ok(next)
    }
}

/// Runs the complete analysis over `source`, leaving it rewound to the start.
#[instrument(skip_all, name = "flexibility_workflow")]
pub fn run<R: BufRead + Seek>(
    source: &mut FrameSource<R>,
    reporter: &ProgressReporter,
) -> Result<FlexibilityResult, EngineError> {
    info!("Starting flexibility analysis.");
    let result = Driver::new(source, reporter).run()?;
    info!(
        mean_rmsd = result.mean_rmsd,
        frame_count = result.frame_count,
        atom_count = result.atom_count,
        "Flexibility analysis complete."
    );
    Ok(result)
}

/// Opens the trajectory at `path` with the configured format and runs the analysis.
pub fn analyze_path<P: AsRef<Path>>(
    path: P,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<FlexibilityResult, EngineError> {
    debug!(path = %path.as_ref().display(), "Opening trajectory.");
    let mut source = FrameSource::open(path)?.with_marker(config.header_marker);
    run(&mut source, reporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::AnalysisConfigBuilder;
    use crate::engine::progress::Progress;
    use nalgebra::Point3;
    use std::io::Cursor;
    use std::sync::Mutex;

    fn source(text: &str) -> FrameSource<Cursor<Vec<u8>>> {
        FrameSource::new(Cursor::new(text.as_bytes().to_vec()))
    }

    fn analyze(text: &str) -> Result<FlexibilityResult, EngineError> {
        run(&mut source(text), &ProgressReporter::new())
    }

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn two_equidistant_frames_keep_the_first_as_closest() {
        let result = analyze(">frame 1\n0 0 0\n>frame 2\n2 0 0\n").unwrap();

        assert_eq!(result.mean.positions(), &[Point3::new(1.0, 0.0, 0.0)]);
        assert_eq!(result.closest.index, 1);
        assert_eq!(result.closest.frame.header(), "frame 1");
        assert!(f64_approx_equal(result.closest.rmsd_to_mean, 1.0));
        assert!(f64_approx_equal(result.mean_rmsd, 1.0));
        assert_eq!(format!("{:.4}", result.mean_rmsd), "1.0000");
    }

    #[test]
    fn three_frames_select_the_middle_one() {
        let result = analyze(">a\n0 0 0\n>b\n3 0 0\n>c\n6 0 0\n").unwrap();

        assert_eq!(result.frame_count, 3);
        assert_eq!(result.atom_count, 1);
        assert_eq!(result.mean.positions(), &[Point3::new(3.0, 0.0, 0.0)]);
        assert_eq!(result.closest.frame.header(), "b");
        assert_eq!(result.closest.rmsd_to_mean, 0.0);
        // RMSDs to the middle frame are 3, 0 and 3.
        assert!(f64_approx_equal(result.mean_rmsd, 2.0));
        assert_eq!(format!("{:.4}", result.mean_rmsd), "2.0000");
    }

    #[test]
    fn identical_frames_have_zero_flexibility() {
        let frame = ">t\n1.5 -2 3\n0 0 0\n10 10 10\n";
        let result = analyze(&frame.repeat(5)).unwrap();
        assert_eq!(result.frame_count, 5);
        assert_eq!(result.atom_count, 3);
        assert_eq!(result.mean_rmsd, 0.0);
    }

    #[test]
    fn running_twice_on_the_same_source_is_idempotent() {
        let mut src = source(">a\n0 0 0\n1 0 0\n>b\n0.5 1 0\n1 2 0\n>c\n0 -1 0\n2 0 1\n");
        let reporter = ProgressReporter::new();
        let first = run(&mut src, &reporter).unwrap();
        let second = run(&mut src, &reporter).unwrap();
        assert_eq!(first, second);

        let frame = src.next_frame().unwrap().unwrap();
        assert_eq!(frame.header(), "a", "source must be left rewound");
    }

    #[test]
    fn driver_walks_through_every_state() {
        let mut src = source(">a\n0 0 0\n>b\n2 0 0\n");
        let reporter = ProgressReporter::new();
        let mut driver = Driver::new(&mut src, &reporter);

        assert_eq!(driver.state().name(), "Init");
        let mut visited = Vec::new();
        while !driver.is_done() {
            visited.push(driver.advance().unwrap().name());
        }
        assert_eq!(visited, vec!["Counted", "MeanComputed", "ClosestFound", "Done"]);

        assert_eq!(driver.advance().unwrap().name(), "Done");
    }

    #[test]
    fn failure_is_absorbing() {
        let mut src = source(">a\n0 0 0\n>b\n1 1 1\n2 2 2\n");
        let reporter = ProgressReporter::new();
        let mut driver = Driver::new(&mut src, &reporter);

        driver.advance().unwrap();
        let err = driver.advance().unwrap_err();
        assert!(matches!(err, EngineError::AtomCountMismatch { ref header, .. } if header == "b"));
        assert_eq!(driver.state().name(), "Failed");
        assert!(matches!(driver.advance(), Err(EngineError::DriverFailed)));
    }

    #[test]
    fn latin1_headers_do_not_abort_the_analysis() {
        let mut src = FrameSource::new(Cursor::new(b">caf\xE9\n0 0 0\n>b\n2 0 0\n".to_vec()));
        let result = run(&mut src, &ProgressReporter::new()).unwrap();
        assert!(f64_approx_equal(result.mean_rmsd, 1.0));
        assert_eq!(result.closest.frame.header(), "caf\u{FFFD}");
    }

    #[test]
    fn empty_trajectory_produces_no_result() {
        assert!(matches!(
            analyze("\n\n"),
            Err(EngineError::EmptyTrajectory { marker: '>' })
        ));
    }

    #[test]
    fn malformed_coordinates_abort_the_analysis() {
        let err = analyze(">a\n1 2 3\n>b\n1 2\n").unwrap_err();
        assert!(matches!(err, EngineError::Trajectory { .. }));
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn reports_one_phase_per_pass() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        run(&mut source(">a\n0 0 0\n>b\n2 0 0\n"), &reporter).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        let passes: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                Progress::PassStart { name } => Some(*name),
                _ => None,
            })
            .collect();
        assert_eq!(
            passes,
            vec![
                "Counting frames",
                "Computing mean frame",
                "Finding closest frame",
                "Averaging RMSD"
            ]
        );
        let increments = events
            .iter()
            .filter(|e| matches!(e, Progress::TaskIncrement))
            .count();
        assert_eq!(increments, 6);
    }

    #[test]
    fn analyze_path_uses_configured_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traj.txt");
        std::fs::write(&path, "@a\n0 0 0\n@b\n3 0 0\n@c\n6 0 0\n").unwrap();

        let config = AnalysisConfigBuilder::new()
            .header_marker('@')
            .build()
            .unwrap();
        let result = analyze_path(&path, &config, &ProgressReporter::new()).unwrap();
        assert!(f64_approx_equal(result.mean_rmsd, 2.0));

        let default = analyze_path(&path, &AnalysisConfig::default(), &ProgressReporter::new());
        assert!(matches!(
            default,
            Err(EngineError::EmptyTrajectory { marker: '>' })
        ));
    }
}
