//! Errors raised while loading, saving or validating `config.ron`.

use std::path::PathBuf;

use farview_math::DepthRangeError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// RON syntax or schema mismatch; the span points into the file.
    #[error("malformed {}: {source}", path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("cannot serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// The near/far planes cannot drive logarithmic depth.
    #[error("invalid depth range: {0}")]
    DepthRange(#[from] DepthRangeError),

    #[error("invalid config: {0}")]
    Invalid(String),
}
