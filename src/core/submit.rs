// Authors: Robert Lopez

use super::{
    credentials::UploadCredentials,
    outcome::{FailureCause, UploadOutcome},
};
use crate::error::Error;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use std::path::Path;
use tracing::{debug, info, warn};

/// Name of the multipart field carrying the file contents.
pub const FILE_FIELD: &str = "file";

/// A file selected for upload, held in memory for one attempt.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// Reads the whole file at `path`, naming it after the last path segment.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or(Error::internal("path has no usable file name"))?;

        let bytes = tokio::fs::read(path).await?;

        Ok(Self::new(file_name, bytes))
    }
}

/// Builds the multipart form for a pre-signed POST
///
/// Every credential field is added in order, followed by the file
/// under `FILE_FIELD`. The storage service ignores fields after the file,
/// so nothing else is appended.
pub fn build_form(credentials: &UploadCredentials, file: UploadFile) -> Result<Form, Error> {
    let mut form = Form::new();

    for (name, value) in &credentials.fields {
        form = form.text(name.clone(), value.clone());
    }

    let mut part = Part::bytes(file.bytes).file_name(file.file_name);

    if let Some(content_type) = file.content_type {
        part = part
            .mime_str(&content_type)
            .map_err(|err| Error::Internal(format!("invalid content type: {}", err)))?;
    }

    Ok(form.part(FILE_FIELD, part))
}

/// Submits `file` to the pre-signed POST target in `credentials`
///
/// Only the response status is inspected. Transport errors and non 2xx
/// statuses both resolve to `UploadOutcome::Failure`.
///
/// ---
/// Example Usage:
/// ```
///
/// let client: Client = ...;
/// let credentials: UploadCredentials = ...;
///
/// let outcome: UploadOutcome = submit(
///     &client,
///     &credentials,
///     UploadFile::new("a.png", bytes),
/// ).await;
/// ```
pub async fn submit(
    client: &Client,
    credentials: &UploadCredentials,
    file: UploadFile,
) -> UploadOutcome {
    let key = match credentials.key() {
        Some(key) => key.to_string(),
        None => {
            return UploadOutcome::failure(FailureCause::Credentials(
                "fields did not contain a key".to_string(),
            ))
        }
    };

    let form = match build_form(credentials, file) {
        Ok(form) => form,
        Err(err) => return UploadOutcome::failure(FailureCause::File(err.to_string())),
    };

    let response = match client.post(&credentials.url).multipart(form).send().await {
        Ok(response) => response,
        Err(err) => {
            warn!(url = %credentials.url, error = %err, "upload request failed");

            return UploadOutcome::failure(FailureCause::Transport(err.to_string()));
        }
    };

    let status = response.status();
    debug!(url = %credentials.url, %status, "upload response");

    if !status.is_success() {
        warn!(url = %credentials.url, %status, "upload rejected");

        return UploadOutcome::failure(FailureCause::Rejected(status.as_u16()));
    }

    info!(%key, "upload succeeded");

    UploadOutcome::Success { key }
}
