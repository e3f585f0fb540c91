pub struct DefaultsConfig {
    pub program_prefix: String,
    pub pause_seconds: f64,
    pub strict: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            program_prefix: "dandelion-".to_string(),
            pause_seconds: 0.0,
            strict: false,
        }
    }
}

impl DefaultsConfig {
    /// Program run for a stage when the config file names none, e.g. `dandelion-run-neb`.
    pub fn program_for(&self, stage: &str) -> String {
        format!("{}{}", self.program_prefix, stage.replace('_', "-"))
    }
}
