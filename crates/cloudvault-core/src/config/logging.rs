//! Log output settings.

use serde::{Deserialize, Serialize};

/// Log filter and output format.
///
/// `RUST_LOG`, when set, replaces `level` entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `cloudvault_service=debug,info`.
    #[serde(default = "default_level")]
    pub level: String,
    /// `json` for machine-readable lines; anything else prints human-readable output.
    #[serde(default = "default_format")]
    pub format: String,
}

impl LoggingConfig {
    /// Whether to emit one JSON object per line.
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_level() -> String {
    "info".into()
}

fn default_format() -> String {
    "json".into()
}
