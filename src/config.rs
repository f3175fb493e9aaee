// Authors: Robert Lopez

//! Configuration loaded from environment variables.
//!
//! ## Client
//! - `SIGNED_POST_URL`: signed post endpoint (default: "http://127.0.0.1:8080/signed-post")
//!
//! ## Issuer
//! - `APP_UPLOADER_BUCKET`: target bucket (required)
//! - `APP_UPLOADER_EXPIRATION_SECONDS`: policy lifetime, at most 604800 (default: 300)
//! - `APP_UPLOADER_CONTENT_LENGTH_MIN`: smallest accepted upload in bytes (default: 0)
//! - `APP_UPLOADER_CONTENT_LENGTH_MAX`: largest accepted upload in bytes (default: 10485760)
//! - `APP_UPLOADER_ENDPOINT_URL`: POST target (default: "https://<bucket>.s3.amazonaws.com/")
//! - `APP_UPLOADER_REGION`: signing region (default: AWS provider chain)
//! - `APP_UPLOADER_ACCESS_KEY_ID` / `APP_UPLOADER_SECRET_ACCESS_KEY`: static
//!   credentials, both or neither (default: AWS provider chain)
//!
//! ## Server
//! - `HOST`: bind address (default: "127.0.0.1")
//! - `PORT`: bind port (default: 8080)

use crate::error::Error;
use std::{env, str::FromStr};

pub const DEFAULT_SIGNED_POST_URL: &str = "http://127.0.0.1:8080/signed-post";

/// Longest policy lifetime, the SigV4 presigning maximum of seven days.
pub const MAX_EXPIRATION_SECONDS: u64 = 604_800;

fn var(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn lookup_var<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.trim().is_empty())
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup_var(lookup, name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|err| Error::Config(format!("{}={:?}: {}", name, value, err))),
        None => Ok(default),
    }
}

/// Settings for the uploading side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub signed_post_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            signed_post_url: DEFAULT_SIGNED_POST_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(var)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            signed_post_url: lookup_var(&lookup, "SIGNED_POST_URL")
                .unwrap_or_else(|| DEFAULT_SIGNED_POST_URL.to_string()),
        }
    }
}

/// Static access keys, used instead of the AWS provider chain when set.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticKeys {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for StaticKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticKeys")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .finish()
    }
}

/// Settings for issuing signed post credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerConfig {
    pub bucket: String,
    pub expiration_seconds: u64,
    pub content_length_min: u64,
    pub content_length_max: u64,
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
    pub static_keys: Option<StaticKeys>,
}

impl IssuerConfig {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            expiration_seconds: 300,
            content_length_min: 0,
            content_length_max: 10 * 1024 * 1024,
            endpoint_url: None,
            region: None,
            static_keys: None,
        }
    }

    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(var)
    }

    /// Reads the settings through `lookup`, `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bucket = lookup_var(&lookup, "APP_UPLOADER_BUCKET")
            .ok_or(Error::config("APP_UPLOADER_BUCKET must be set"))?;
        let defaults = Self::new(&bucket);

        let static_keys = match (
            lookup_var(&lookup, "APP_UPLOADER_ACCESS_KEY_ID"),
            lookup_var(&lookup, "APP_UPLOADER_SECRET_ACCESS_KEY"),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticKeys {
                access_key_id,
                secret_access_key,
            }),
            (None, None) => None,
            _ => {
                return Err(Error::config(
                    "APP_UPLOADER_ACCESS_KEY_ID and APP_UPLOADER_SECRET_ACCESS_KEY must be set together",
                ))
            }
        };

        let config = Self {
            bucket,
            expiration_seconds: parse_var(
                &lookup,
                "APP_UPLOADER_EXPIRATION_SECONDS",
                defaults.expiration_seconds,
            )?,
            content_length_min: parse_var(
                &lookup,
                "APP_UPLOADER_CONTENT_LENGTH_MIN",
                defaults.content_length_min,
            )?,
            content_length_max: parse_var(
                &lookup,
                "APP_UPLOADER_CONTENT_LENGTH_MAX",
                defaults.content_length_max,
            )?,
            endpoint_url: lookup_var(&lookup, "APP_UPLOADER_ENDPOINT_URL"),
            region: lookup_var(&lookup, "APP_UPLOADER_REGION"),
            static_keys,
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.bucket.is_empty() {
            return Err(Error::config("bucket must not be empty"));
        }

        if self.expiration_seconds == 0 || self.expiration_seconds > MAX_EXPIRATION_SECONDS {
            return Err(Error::Config(format!(
                "expiration seconds must be within 1..={}, got {}",
                MAX_EXPIRATION_SECONDS, self.expiration_seconds
            )));
        }

        if self.content_length_min > self.content_length_max {
            return Err(Error::Config(format!(
                "content length min {} exceeds max {}",
                self.content_length_min, self.content_length_max
            )));
        }

        Ok(())
    }

    /// POST target for uploads, virtual hosted S3 unless overridden.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint_url {
            Some(url) => url.clone(),
            None => format!("https://{}.s3.amazonaws.com/", self.bucket),
        }
    }
}

/// Bind address of the signed post server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(var)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            host: lookup_var(&lookup, "HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_var(&lookup, "PORT", 8080)?,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
