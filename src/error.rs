use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LazylabError {
    #[error("could not obtain user home directory")]
    NoHomeDir,

    #[error("could not read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    ConfigParse(String),

    #[error("invalid server address '{0}': {1}")]
    InvalidServer(String, String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("{method} {url}: {status} {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LazylabError>;
