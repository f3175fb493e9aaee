// Authors: Robert Lopez

use crate::error::Error;
use indexmap::IndexMap;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the form field holding the object key.
pub const KEY_FIELD: &str = "key";

/// Target and form fields of a pre-signed POST upload.
///
/// `fields` keeps the order in which the fields were issued; they are sent
/// in that order ahead of the file part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadCredentials {
    pub url: String,
    pub fields: IndexMap<String, String>,
}

impl UploadCredentials {
    /// The object key the upload will be stored under, if issued.
    pub fn key(&self) -> Option<&str> {
        self.fields.get(KEY_FIELD).map(String::as_str)
    }

    /// Parses and validates a signed post payload.
    ///
    /// Fails with `Error::Parse` when the body is not JSON, `url` or `fields`
    /// are missing, a field value is not a string, the url does not parse,
    /// or no `key` field was issued.
    pub fn from_slice(body: &[u8]) -> Result<Self, Error> {
        let credentials: Self =
            serde_json::from_slice(body).map_err(|err| Error::Parse(err.to_string()))?;

        Url::parse(&credentials.url)
            .map_err(|err| Error::Parse(format!("invalid url {:?}: {}", credentials.url, err)))?;

        if credentials.key().is_none() {
            return Err(Error::parse("fields did not contain a key"));
        }

        Ok(credentials)
    }
}

/// Fetches upload credentials from the signed post endpoint
///
/// A single attempt is made, there is no retry.
///
/// ---
/// Example Usage:
/// ```
///
/// let client: Client = ...;
///
/// let credentials: UploadCredentials = fetch_credentials(
///     &client,
///     "http://127.0.0.1:8080/signed-post",
/// ).await?;
/// ```
pub async fn fetch_credentials(
    client: &Client,
    signed_post_url: &str,
) -> Result<UploadCredentials, Error> {
    let response = client.get(signed_post_url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::CredentialsRejected {
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await?;
    let credentials = UploadCredentials::from_slice(&body)?;

    debug!(
        url = %credentials.url,
        fields = ?credentials.fields.keys().collect::<Vec<_>>(),
        "fetched upload credentials"
    );

    Ok(credentials)
}
