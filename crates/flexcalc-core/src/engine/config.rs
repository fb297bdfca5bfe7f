use crate::core::io::trajectory::DEFAULT_HEADER_MARKER;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error(
        "Invalid header marker '{0}': it must not be whitespace or a character that can start a number"
    )]
    InvalidHeaderMarker(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// First character of every line that opens a new frame.
    pub header_marker: char,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            header_marker: DEFAULT_HEADER_MARKER,
        }
    }
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    header_marker: Option<char>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header_marker(mut self, marker: char) -> Self {
        self.header_marker = Some(marker);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let header_marker = self.header_marker.unwrap_or(DEFAULT_HEADER_MARKER);
        if header_marker.is_whitespace()
            || header_marker.is_ascii_digit()
            || matches!(header_marker, '+' | '-' | '.' | 'n' | 'N' | 'i' | 'I')
        {
            return Err(ConfigError::InvalidHeaderMarker(header_marker));
        }
        Ok(AnalysisConfig { header_marker })
    }
}
