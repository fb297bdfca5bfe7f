use flexcalc::engine::config as core_config;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub precision: usize,
    pub details: bool,
    pub write_mean: Option<PathBuf>,
    pub write_closest: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub core_config: core_config::AnalysisConfig,
    pub output: OutputConfig,
    pub show_progress: bool,
}
