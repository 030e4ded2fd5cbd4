use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Mount point unavailable: {0}")]
    MountUnavailable(String),

    #[error("Presentation already started")]
    DoubleInit,

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
