// Authors: Robert Lopez

use crate::error::Error;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const SERVICE: &str = "s3";

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|err| Error::Signing(err.to_string()))?;
    mac.update(data);

    Ok(mac.finalize().into_bytes().to_vec())
}

/// `yyyymmdd`, the date part of a credential scope.
pub fn date_stamp(time: &DateTime<Utc>) -> String {
    time.format("%Y%m%d").to_string()
}

/// `yyyymmddTHHMMSSZ`, the value of `X-Amz-Date`.
pub fn amz_date(time: &DateTime<Utc>) -> String {
    time.format("%Y%m%dT%H%M%SZ").to_string()
}

/// `<access key>/<date>/<region>/s3/aws4_request`
pub fn credential_scope(access_key_id: &str, time: &DateTime<Utc>, region: &str) -> String {
    format!(
        "{}/{}/{}/{}/aws4_request",
        access_key_id,
        date_stamp(time),
        region,
        SERVICE
    )
}

/// Derives the SigV4 signing key for a date, region and service.
pub fn derive_signing_key(
    secret_access_key: &str,
    date_stamp: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, Error> {
    let k_date = hmac_sha256(
        format!("AWS4{}", secret_access_key).as_bytes(),
        date_stamp.as_bytes(),
    )?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;

    hmac_sha256(&k_service, b"aws4_request")
}

/// Hex encoded HMAC-SHA256 of `string_to_sign`.
pub fn compute_signature(signing_key: &[u8], string_to_sign: &str) -> Result<String, Error> {
    Ok(hex::encode(hmac_sha256(
        signing_key,
        string_to_sign.as_bytes(),
    )?))
}
