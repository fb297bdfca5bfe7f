pub struct DefaultsConfig {
    pub header_marker: char,
    pub precision: usize,
    pub details: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            header_marker: '>',
            precision: 4,
            details: false,
        }
    }
}
