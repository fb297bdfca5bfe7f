use crate::config::{AppConfig, OutputConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use flexcalc::core::io::trajectory::{FrameSource, write_frame};
use flexcalc::core::models::frame::Frame;
use flexcalc::engine::progress::ProgressReporter;
use flexcalc::workflows::flexibility::{self, FlexibilityResult};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

pub fn run(config: &AppConfig) -> Result<()> {
    let result = analyze(config)?;

    if let Some(path) = &config.output.write_mean {
        save_frame(path, &result.mean, config.core_config.header_marker)?;
    }
    if let Some(path) = &config.output.write_closest {
        save_frame(path, &result.closest.frame, config.core_config.header_marker)?;
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(render_report(&result, &config.output).as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn analyze(config: &AppConfig) -> Result<FlexibilityResult> {
    info!("Loading trajectory from {:?}", &config.input_path);
    let file = File::open(&config.input_path).map_err(|source| CliError::Input {
        path: config.input_path.clone(),
        source,
    })?;
    let mut source =
        FrameSource::new(BufReader::new(file)).with_marker(config.core_config.header_marker);

    let progress_handler = config.show_progress.then(CliProgressHandler::new);
    let reporter = match &progress_handler {
        Some(handler) => ProgressReporter::with_callback(handler.get_callback()),
        None => ProgressReporter::new(),
    };

    Ok(flexibility::run(&mut source, &reporter)?)
}

fn save_frame(path: &Path, frame: &Frame, marker: char) -> Result<()> {
    info!("Writing frame '{}' to {:?}", frame.header(), path);
    let write = || -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        write_frame(&mut writer, frame, marker)?;
        writer.flush()
    };
    write().map_err(|source| CliError::Output {
        path: path.to_path_buf(),
        source,
    })
}

pub fn format_score(value: f64, precision: usize) -> String {
    format!("{:.*}", precision, value)
}

/// The score line, optionally followed by a summary of the analysis.
pub fn render_report(result: &FlexibilityResult, output: &OutputConfig) -> String {
    let mut report = format_score(result.mean_rmsd, output.precision);
    report.push('\n');
    if output.details {
        report.push_str(&format!("frames: {}\n", result.frame_count));
        report.push_str(&format!("atoms: {}\n", result.atom_count));
        report.push_str(&format!(
            "closest-frame: {} ({})\n",
            result.closest.index,
            result.closest.frame.header()
        ));
        report.push_str(&format!(
            "closest-rmsd-to-mean: {}\n",
            format_score(result.closest.rmsd_to_mean, output.precision)
        ));
    }
    report
}
