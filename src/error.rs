use std::{io, num::ParseIntError, path::PathBuf};

use crate::mpl;

/// Everything that can stop a renderer.  All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot open `{}`: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("read error: {0}")]
    Read(#[from] io::Error),
    /// A histogram token is not an integer.
    #[error("line {line}: `{token}` is not an integer")]
    ParseInt {
        line: usize,
        token: String,
        #[source]
        source: ParseIntError,
    },
    /// The histogram input has no line at all.
    #[error("the input holds no data series")]
    EmptyInput,
    /// A timing line is not a valid record.
    #[error("line {line}: malformed timing record: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    /// The type is not a key of the style registry in use.
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error(transparent)]
    Plot(#[from] mpl::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
