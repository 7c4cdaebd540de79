use std::io;

use http::StatusCode;
use thiserror::Error;

/// Why a call to an endpoint failed.
#[derive(Error, Debug)]
pub enum CallError {
    #[error("'{0}' not found")]
    NotFound(String),
    #[error("unable to parse request body: {0}")]
    MalformedBody(serde_json::Error),
    #[error("unable to get args from request body")]
    MissingArgs,
    #[error("wrong number of args, expected: {expected}, got: {actual}")]
    ArgCount { expected: usize, actual: usize },
    #[error("unable to decode arg {index}: {source}")]
    Decode {
        index: usize,
        source: serde_json::Error,
    },
    #[error("{0}")]
    Invocation(String),
    #[error("{0}")]
    Panic(String),
    #[error("error serialising the result: {0}")]
    Encode(serde_json::Error),
}

impl CallError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Generating a client binding failed because of how the endpoints were registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
    #[error("'{path}' is registered both as an endpoint and as a namespace")]
    Conflict { path: String },
    #[error("'{path}' and '{other}' resolve to the same namespace")]
    Duplicate { path: String, other: String },
    #[error("record '{name}' clashes with another declaration of the same name")]
    RecordConflict { name: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("base path must start with '/' and must not be empty, got: {0:?}")]
    InvalidBasePath(String),
    #[error("transport function name is not a valid identifier: {0:?}")]
    InvalidTransportFn(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("failed to write bindings: {0}")]
    Io(#[from] io::Error),
}
