/*!
Specialized `Error` and `Result` types for the paging simulator.
*/

use std::{fmt, io, result};

/// Fatal errors of a simulation run.
///
/// Configuration problems that only deserve a warning are reported as
/// `ConfigWarning` by the config loader and never end up here.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Invalid configuration.
    ///
    /// The loaded parameters cannot drive a simulation (ex. a decay interval of zero).
    InvalidConfig(&'static str),
    /// Malformed address token.
    ///
    /// A token of the access stream is not a base-16 number of at most 6 characters.
    MalformedAddress(String),
    /// IO error
    ///
    /// Reading the access stream or writing the report has failed.
    Io(io::ErrorKind),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.kind())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidConfig(reason) => write!(f, "invalid configuration: {}", reason),
            Error::MalformedAddress(token) => {
                write!(f, "malformed virtual address token {:?}", token)
            }
            Error::Io(kind) => write!(f, "io error: {}", kind),
        }
    }
}

impl std::error::Error for Error {}

/// Specialized `Result` type for simulation errors.
pub type Result<T> = result::Result<T, Error>;
