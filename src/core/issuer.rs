// Authors: Robert Lopez

use super::{
    credentials::{UploadCredentials, KEY_FIELD},
    policy::PostPolicy,
    signer::{
        amz_date, compute_signature, credential_scope, date_stamp, derive_signing_key, ALGORITHM,
        SERVICE,
    },
};
use crate::{config::IssuerConfig, error::Error};
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_s3::config::Credentials;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use tracing::debug;

/// Issues pre-signed POST credentials for uploads straight to a bucket.
///
/// The returned `UploadCredentials` are meant to be used as:
/// - `url` as the POST target
/// - `multipart/form-data` encoding
/// - every `fields` pair as a form field, in order
/// - the file contents in a last field named `file`
pub struct PresignedPostIssuer {
    config: IssuerConfig,
    credentials_provider: SharedCredentialsProvider,
    region: String,
}

impl PresignedPostIssuer {
    pub fn new(
        config: IssuerConfig,
        credentials_provider: SharedCredentialsProvider,
        region: &str,
    ) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            config,
            credentials_provider,
            region: region.to_string(),
        })
    }

    /// Constructs an issuer from `config`, falling back to the AWS
    /// environment for credentials and region when they are not configured.
    pub async fn from_config(config: IssuerConfig) -> Result<Self, Error> {
        let sdk_config = aws_config::from_env().load().await;

        let credentials_provider = match &config.static_keys {
            Some(keys) => SharedCredentialsProvider::new(Credentials::new(
                keys.access_key_id.clone(),
                keys.secret_access_key.clone(),
                None,
                None,
                "presigned-post",
            )),
            None => sdk_config
                .credentials_provider()
                .ok_or(Error::Credentials(
                    "no credentials provider configured".to_string(),
                ))?,
        };

        let region = match &config.region {
            Some(region) => region.clone(),
            None => sdk_config
                .region()
                .map(|region| region.to_string())
                .ok_or(Error::config("no region configured"))?,
        };

        Self::new(config, credentials_provider, &region)
    }

    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Issues credentials allowing one upload under `key`, signed now.
    ///
    /// ---
    /// Example Usage:
    /// ```
    ///
    /// let issuer: PresignedPostIssuer = ...;
    ///
    /// let credentials: UploadCredentials = issuer
    ///     .create_presigned_post("uploads/shark.png")
    ///     .await?;
    /// ```
    pub async fn create_presigned_post(&self, key: &str) -> Result<UploadCredentials, Error> {
        self.create_presigned_post_at(key, Utc::now()).await
    }

    /// Issues credentials allowing one upload under `key`, signed at `now`.
    pub async fn create_presigned_post_at(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<UploadCredentials, Error> {
        let credentials = self
            .credentials_provider
            .provide_credentials()
            .await
            .map_err(Error::credentials)?;

        let mut fields = IndexMap::new();
        fields.insert("bucket".to_string(), self.config.bucket.clone());
        fields.insert(KEY_FIELD.to_string(), key.to_string());
        fields.insert("X-Amz-Algorithm".to_string(), ALGORITHM.to_string());
        fields.insert(
            "X-Amz-Credential".to_string(),
            credential_scope(credentials.access_key_id(), &now, &self.region),
        );
        fields.insert("X-Amz-Date".to_string(), amz_date(&now));

        if let Some(session_token) = credentials.session_token() {
            fields.insert(
                "X-Amz-Security-Token".to_string(),
                session_token.to_string(),
            );
        }

        let expiration = i64::try_from(self.config.expiration_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(Error::config("expiration seconds out of range"))?;

        let mut policy = PostPolicy::new(
            expiration,
            self.config.content_length_min,
            self.config.content_length_max,
        );

        for (name, value) in &fields {
            policy.add_equals_condition(name, value);
        }

        let policy = policy.to_base64()?;

        let signing_key = derive_signing_key(
            credentials.secret_access_key(),
            &date_stamp(&now),
            &self.region,
            SERVICE,
        )?;
        let signature = compute_signature(&signing_key, &policy)?;

        fields.insert("Policy".to_string(), policy);
        fields.insert("X-Amz-Signature".to_string(), signature);

        debug!(%key, bucket = %self.config.bucket, "issued presigned post");

        Ok(UploadCredentials {
            url: self.config.endpoint_url(),
            fields,
        })
    }
}
