// Authors: Robert Lopez

use std::fmt;

/// Message shown when an upload did not succeed, whatever the cause.
pub const FAILURE_MESSAGE: &str = "アップロード失敗";

/// Why an upload attempt failed.
///
/// Only used for logging and inspection, every cause renders as
/// `FAILURE_MESSAGE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// No file could be obtained for the attempt.
    File(String),
    /// Credentials could not be fetched or parsed.
    Credentials(String),
    /// The upload request did not complete.
    Transport(String),
    /// The storage service answered with a non 2xx status.
    Rejected(u16),
}

/// Result of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success { key: String },
    Failure { cause: FailureCause },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub(crate) fn failure(cause: FailureCause) -> Self {
        Self::Failure { cause }
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Success { key } => write!(f, "アップロード成功: key={}", key),
            Self::Failure { .. } => f.write_str(FAILURE_MESSAGE),
        }
    }
}
