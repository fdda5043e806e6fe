use thiserror::Error;

/// Failures of the viewer core. None of them is fatal to the window: the
/// worst outcome is a placeholder track.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewerError {
    #[error("series has no samples")]
    EmptySeries,
    #[error("channel \"{channel}\" not in log (tried {})", .tried.join(", "))]
    ChannelUnavailable { channel: String, tried: Vec<String> },
    #[error("invalid series: {0}")]
    InvalidSeries(String),
}

/// Failures while reading a log file from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not find a header line starting with \"{0}\"")]
    MissingHeader(String),
    #[error("expected a \"{expected}\" column, found: {found:?}")]
    MissingTimeColumn { expected: String, found: Vec<String> },
    #[error("no data rows found after parsing the log")]
    NoRows,
}

/// Failures while reading a layout file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read layout file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid layout file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("layout defines no channels")]
    NoChannels,
}
