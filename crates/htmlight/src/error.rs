use thiserror::Error;

/// Errors surfaced while rendering decorated output.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The sink (or a decorator writing into it) failed.
    #[error("failed to write decorated output: {0}")]
    Io(#[from] std::io::Error),

    /// A base URL handed to a link rewriting policy could not be parsed.
    #[error("invalid base url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
