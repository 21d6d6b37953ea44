use crate::xhr::ObservableField;

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("Property \"{0}\" does not have a getter")]
    MissingAccessor(ObservableField),

    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Invalid URL pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("No tokio runtime available to drive the request")]
    NoRuntime,
}
