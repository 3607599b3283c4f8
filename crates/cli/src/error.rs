use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] drinks_auth::ConfigError),

    #[error("authorization failed: {0}")]
    Auth(#[from] drinks_auth::AuthError),

    #[error("key set error: {0}")]
    Key(#[from] drinks_auth::KeyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
