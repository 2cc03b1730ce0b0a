//! Domain error types.

/// Top-level error type for volbreak.
#[derive(Debug, thiserror::Error)]
pub enum VolbreakError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("bar feed error for {symbol}: {reason}")]
    Feed { symbol: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VolbreakError {
    /// Shorthand for an out-of-range strategy parameter.
    pub fn invalid_param(key: &str, reason: impl Into<String>) -> Self {
        VolbreakError::ConfigInvalid {
            section: "strategy".into(),
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl From<&VolbreakError> for std::process::ExitCode {
    fn from(err: &VolbreakError) -> Self {
        let code: u8 = match err {
            VolbreakError::Io(_) => 1,
            VolbreakError::ConfigParse { .. }
            | VolbreakError::ConfigMissing { .. }
            | VolbreakError::ConfigInvalid { .. } => 2,
            VolbreakError::Feed { .. } => 3,
        };
        std::process::ExitCode::from(code)
    }
}
