// Authors: Robert Lopez

pub mod config;
pub mod core;
pub mod error;

#[cfg(test)]
mod tests;

use crate::{
    config::ClientConfig,
    core::{
        credentials::{fetch_credentials, UploadCredentials},
        outcome::{FailureCause, UploadOutcome},
        submit::{submit, UploadFile},
    },
    error::Error,
};
use reqwest::Client;
use std::sync::Arc;

/// Client uploading files through a pre-signed POST
///
/// ---
/// Example Usage:
/// ```
///
/// let uploader = Uploader::new("http://127.0.0.1:8080/signed-post");
///
/// let shark_image = UploadFile::from_path("./shark.png").await?;
///
/// let outcome: UploadOutcome = uploader.upload(shark_image).await;
///
/// println!("{}", outcome);
/// ```
pub struct Uploader {
    pub client: Arc<Client>,
    pub signed_post_url: String,
}

impl Uploader {
    /// Constructs a new Uploader fetching credentials from `signed_post_url`
    ///
    /// ---
    /// Example Usage:
    /// ```
    ///
    /// let uploader = Uploader::new("http://127.0.0.1:8080/signed-post");
    /// ```
    pub fn new(signed_post_url: &str) -> Self {
        Self {
            client: Arc::new(Client::new()),
            signed_post_url: signed_post_url.to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.signed_post_url)
    }

    /// Fetches one set of upload credentials from the signed post endpoint
    ///
    /// ---
    /// Example Usage:
    /// ```
    ///
    /// let uploader: Uploader = ...;
    ///
    /// let credentials: UploadCredentials = uploader.fetch_credentials().await?;
    /// ```
    pub async fn fetch_credentials(&self) -> Result<UploadCredentials, Error> {
        fetch_credentials(&self.client, &self.signed_post_url).await
    }

    /// Submits `file` to the target described by `credentials`
    ///
    /// ---
    /// Example Usage:
    /// ```
    ///
    /// let uploader: Uploader = ...;
    /// let credentials: UploadCredentials = ...;
    /// let file: UploadFile = ...;
    ///
    /// let outcome: UploadOutcome = uploader.submit(&credentials, file).await;
    /// ```
    pub async fn submit(&self, credentials: &UploadCredentials, file: UploadFile) -> UploadOutcome {
        submit(&self.client, credentials, file).await
    }

    /// Fetches credentials and submits `file` with them
    ///
    /// Fails without issuing any POST when the credentials cannot be fetched.
    pub async fn upload(&self, file: UploadFile) -> UploadOutcome {
        match self.fetch_credentials().await {
            Ok(credentials) => self.submit(&credentials, file).await,
            Err(err) => UploadOutcome::Failure {
                cause: FailureCause::Credentials(err.to_string()),
            },
        }
    }
}
