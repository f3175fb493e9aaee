// Authors: Robert Lopez

use std::fmt::Debug;
use thiserror::Error;

/// Error enum to wrap various errors that can occur inside the crate.
///
/// Submission failures are not represented here, they are folded into
/// `UploadOutcome::Failure` so the caller only ever renders one of two messages.
#[derive(Debug, Error)]
pub enum Error {
    #[error("request to signed post endpoint failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("signed post endpoint answered with status {status}")]
    CredentialsRejected { status: u16 },
    #[error("malformed upload credentials: {0}")]
    Parse(String),
    #[error("an upload is already in progress")]
    Busy,
    #[error(transparent)]
    StdIo(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to resolve AWS credentials: {0}")]
    Credentials(String),
    #[error("failed to sign policy: {0}")]
    Signing(String),
    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn internal(message: &str) -> Self {
        Self::Internal(message.to_string())
    }

    pub fn parse(message: &str) -> Self {
        Self::Parse(message.to_string())
    }

    pub fn config(message: &str) -> Self {
        Self::Config(message.to_string())
    }

    pub fn credentials<E>(err: E) -> Self
    where
        E: Debug,
    {
        Self::Credentials(format!("{:?}", err))
    }
}
