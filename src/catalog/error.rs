use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("403 - Forbidden")]
    Forbidden,

    #[error("404 - Not Found")]
    NotFound,

    #[error("invalid response from SoundCloud: {0}")]
    InvalidResponse(u16),

    #[error("there is a problem by SoundCloud ({0}), please wait a while")]
    ServerProblem(u16),

    #[error("request failed: {0}")]
    Transport(#[source] Box<ureq::Transport>),

    #[error("couldn't read response: {0}")]
    Io(#[from] std::io::Error),

    #[error("couldn't parse response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} is neither a track nor a playlist")]
    UnexpectedKind(String),
}
