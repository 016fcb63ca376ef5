//! AWS Signature Version 4 request signing
//!
//! Signs the exact body bytes that will be sent, so the payload hash always
//! matches what the upstream receives.

use bytes::Bytes;
use hmac::{Hmac, Mac};
use http::HeaderValue;
use http::header::{AUTHORIZATION, HOST};
use jiff::Timestamp;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};

use super::credentials::Credentials;
use crate::error::LlmError;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

type HmacSha256 = Hmac<Sha256>;

/// SigV4 signer bound to one region and service
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    region: String,
    service: String,
}

impl SigV4Signer {
    pub fn new(region: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            service: service.into(),
        }
    }

    /// Add `host`, `x-amz-date`, `x-amz-content-sha256`, the optional
    /// `x-amz-security-token` and the `authorization` header
    ///
    /// Every header present on the request at this point is signed.
    pub fn sign(
        &self,
        request: &mut http::Request<Bytes>,
        credentials: &Credentials,
        time: Timestamp,
    ) -> Result<(), LlmError> {
        let payload_hash = hex::encode(Sha256::digest(request.body()));
        let amz_date = time.strftime("%Y%m%dT%H%M%SZ").to_string();

        let host = request
            .uri()
            .authority()
            .map(|authority| authority.as_str().rsplit('@').next().unwrap_or_default().to_owned())
            .ok_or_else(|| signing_error("request URL has no host"))?;

        let headers = request.headers_mut();
        headers.insert(HOST, header_value(&host)?);
        headers.insert("x-amz-date", header_value(&amz_date)?);
        headers.insert("x-amz-content-sha256", header_value(&payload_hash)?);
        if let Some(token) = credentials.session_token() {
            let mut value = header_value(token.expose_secret())?;
            value.set_sensitive(true);
            headers.insert("x-amz-security-token", value);
        }

        self.authorize(request, credentials, &amz_date, &payload_hash)
    }

    /// Compute the signature over the request as it stands and set
    /// `authorization`
    pub(crate) fn authorize(
        &self,
        request: &mut http::Request<Bytes>,
        credentials: &Credentials,
        amz_date: &str,
        payload_hash: &str,
    ) -> Result<(), LlmError> {
        let date_stamp = amz_date.get(..8).ok_or_else(|| signing_error("malformed signing date"))?;
        let scope = format!("{date_stamp}/{}/{}/aws4_request", self.region, self.service);

        let (canonical_headers, signed_headers) = canonical_headers(request.headers())?;
        let canonical_request = format!(
            "{}\n{}\n{}\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
            request.method(),
            canonical_uri(request.uri().path()),
            canonical_query(request.uri().query().unwrap_or_default()),
        );

        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let key = signing_key(
            credentials.secret_access_key().expose_secret(),
            date_stamp,
            &self.region,
            &self.service,
        );
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

        let authorization = format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            credentials.access_key_id()
        );
        let mut value = header_value(&authorization)?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);

        Ok(())
    }
}

/// Derive the per-day signing key
pub(crate) fn signing_key(secret: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date_stamp.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Sorted `name:value` lines and the `;`-joined signed header list
fn canonical_headers(headers: &http::HeaderMap) -> Result<(String, String), LlmError> {
    let mut names: Vec<&str> = headers
        .keys()
        .map(http::HeaderName::as_str)
        .filter(|name| *name != AUTHORIZATION.as_str())
        .collect();
    names.sort_unstable();

    let mut lines = String::new();
    for name in &names {
        let values = headers
            .get_all(*name)
            .iter()
            .map(|value| {
                value
                    .to_str()
                    .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" "))
                    .map_err(|_| signing_error(format!("header {name} is not valid text")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        lines.push_str(name);
        lines.push(':');
        lines.push_str(&values.join(","));
        lines.push('\n');
    }

    Ok((lines, names.join(";")))
}

/// Path with every segment URI-encoded once more
///
/// Segments already percent-encoded in the request URL are therefore
/// encoded twice, as SigV4 requires for non-S3 services.
fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_owned();
    }

    path.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
}

fn canonical_query(query: &str) -> String {
    let mut pairs: Vec<(&str, &str)> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect();
    pairs.sort_unstable();

    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// AWS URI encoding: everything but `A-Z a-z 0-9 - _ . ~` is escaped
pub(crate) fn uri_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

fn header_value(value: &str) -> Result<HeaderValue, LlmError> {
    HeaderValue::try_from(value).map_err(|_| signing_error("signing value is not a valid header value"))
}

fn signing_error(message: impl std::fmt::Display) -> LlmError {
    LlmError::UpstreamBuild(format!("signing request: {message}"))
}
