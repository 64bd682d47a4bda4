use std::path::PathBuf;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    /// The configuration file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configuration document is not valid YAML for the expected shape.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
    /// The configuration parsed but violates an invariant.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// Unknown resolve-by-name key.
    #[error("unknown config key '{0}'")]
    UnknownKey(String),
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Error reported inside a provider API envelope.
    #[error("provider error: {0}")]
    Provider(String),
    /// Response decoding or protocol-shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
}
