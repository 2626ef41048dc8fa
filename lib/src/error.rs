use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Couldn't find or open file: {}", .0)]
    FileNotFound(String),

    #[error("Error while reading configuration:\n{}", .0)]
    ConfigDeserialization(String),

    #[error("Couldn't read task log file. {}", .0)]
    LogRead(String),

    #[error("Failed to send signal to process group {}: {}", .0, .1)]
    Signal(i32, nix::Error),

    #[error("Some error occurred. {}", .0)]
    Generic(String),

    #[error("Unexpected I/O error:\n{}", .0)]
    RawIoError(#[from] std::io::Error),

    #[error("I/O error at path {:?} while {}:\n{}", .0, .1, .2)]
    IoPathError(PathBuf, &'static str, std::io::Error),
}
