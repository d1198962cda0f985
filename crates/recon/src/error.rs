use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold, empty path, etc.).
    ConfigValidation(String),
    /// A sheet has no column with the configured label name.
    MissingLabelColumn { source: String, sheet: String, column: String },
    /// A file or sheet could not be read or parsed.
    SourceUnreadable { source: String, reason: String },
    /// IO error (output write, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingLabelColumn { source, sheet, column } => {
                write!(f, "{source} [{sheet}]: missing label column '{column}'")
            }
            Self::SourceUnreadable { source, reason } => {
                write!(f, "cannot read {source}: {reason}")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
