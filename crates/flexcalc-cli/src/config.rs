mod defaults;
mod models;

pub use defaults::DefaultsConfig;
pub use models::{AppConfig, OutputConfig};

use crate::cli::Cli;
use crate::error::{CliError, Result};
use flexcalc::engine::config as core_config;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialFormatConfig {
    #[serde(rename = "header-marker")]
    header_marker: Option<char>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    precision: Option<usize>,
    details: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAppConfig {
    format: Option<PartialFormatConfig>,
    output: Option<PartialOutputConfig>,
}

impl PartialAppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the file if one was given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolves the final configuration. Dedicated CLI flags win over `--set` values,
    /// which win over the file, which wins over [`DefaultsConfig`].
    pub fn merge_with_cli(mut self, cli: &Cli) -> Result<AppConfig> {
        self.apply_set_values(&cli.set_values)?;

        let defaults = DefaultsConfig::default();
        let format_config = self.format.take().unwrap_or_default();
        let output_config = self.output.take().unwrap_or_default();

        let header_marker = cli
            .header_marker
            .or(format_config.header_marker)
            .unwrap_or(defaults.header_marker);
        let core_config = core_config::AnalysisConfigBuilder::new()
            .header_marker(header_marker)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let details = if cli.details {
            true
        } else {
            output_config.details.unwrap_or(defaults.details)
        };

        Ok(AppConfig {
            input_path: cli.input.clone(),
            core_config,
            output: OutputConfig {
                precision: cli
                    .precision
                    .or(output_config.precision)
                    .unwrap_or(defaults.precision),
                details,
                write_mean: cli.write_mean.clone(),
                write_closest: cli.write_closest.clone(),
            },
            show_progress: !cli.no_progress && !cli.quiet,
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "format.header-marker" => {
                    let mut chars = value_str.chars();
                    let marker = match (chars.next(), chars.next()) {
                        (Some(c), None) => c,
                        _ => {
                            return Err(CliError::Config(format!(
                                "Invalid single-character value for {}: '{}'",
                                key, value_str
                            )));
                        }
                    };
                    self.format
                        .get_or_insert_with(Default::default)
                        .header_marker = Some(marker);
                }
                "output.precision" => {
                    self.output.get_or_insert_with(Default::default).precision =
                        Some(value_str.parse().map_err(|_| {
                            CliError::Config(format!(
                                "Invalid integer value for {}: {}",
                                key, value_str
                            ))
                        })?);
                }
                "output.details" => {
                    self.output.get_or_insert_with(Default::default).details =
                        Some(value_str.parse().map_err(|_| {
                            CliError::Config(format!(
                                "Invalid boolean value for {}: {}",
                                key, value_str
                            ))
                        })?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
