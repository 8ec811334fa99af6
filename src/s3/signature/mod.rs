//!  S3 signature v4
//! <https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html>

use crate::s3::S3;
use crate::s3::tools::{sha256_digest_string, sha256_hmac, write_hex_bytes};
use chrono::prelude::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Method;
use ring::hmac;
use std::collections::BTreeMap;
use url::Url;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub struct Signature<'a> {
    auth: &'a S3,
    // The HTTPRequestMethod
    http_method: Method,
    // The CanonicalURI
    canonical_uri: String,
    // The CanonicalQueryString
    canonical_query_string: String,
    // host[:port] taken from the request url
    host: String,
    // The HTTP request headers
    headers: BTreeMap<String, String>,
    datetime: DateTime<Utc>,
}

impl<'a> Signature<'a> {
    #[must_use]
    pub fn new(s3: &'a S3, method: Method, url: &Url) -> Self {
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            _ => String::new(),
        };

        Self {
            auth: s3,
            http_method: method,
            canonical_uri: canonical_uri(url),
            canonical_query_string: canonical_query_string(url),
            host,
            headers: BTreeMap::new(),
            datetime: Utc::now(),
        }
    }

    /// Signs the request, `digest` is the `HexEncode(Hash(RequestPayload))`, returns every
    /// header that must be sent including the Authorization one.
    pub fn sign(
        &mut self,
        digest: &str,
        length: Option<usize>,
        extra: Option<BTreeMap<&str, &str>>,
    ) -> BTreeMap<String, String> {
        let current_date = self.datetime.format("%Y%m%d").to_string();
        let current_datetime = self.datetime.format("%Y%m%dT%H%M%SZ").to_string();

        let host = self.host.clone();
        self.add_header("host", &host);
        self.add_header("x-amz-date", &current_datetime);
        self.add_header("user-agent", APP_USER_AGENT);
        self.add_header("x-amz-content-sha256", digest);
        if let Some(length) = length {
            self.add_header("content-length", &length.to_string());
        }
        if let Some(extra) = extra {
            for (k, v) in extra {
                self.add_header(k, v);
            }
        }

        let signed_headers = signed_headers(&self.headers);

        // https://docs.aws.amazon.com/general/latest/gr/sigv4_signing.html
        // 1. Create a canonical request for Signature Version 4
        //
        //     CanonicalRequest =
        //         HTTPRequestMethod + '\n' +
        //         CanonicalURI + '\n' +
        //         CanonicalQueryString + '\n' +
        //         CanonicalHeaders + '\n' +
        //         SignedHeaders + '\n' +
        //         HexEncode(Hash(RequestPayload))
        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            self.http_method.as_str(),
            &self.canonical_uri,
            &self.canonical_query_string,
            canonical_headers(&self.headers),
            signed_headers,
            digest
        );

        log::debug!("canonical request:\n{canonical_request}");

        // 2. Create a string to sign for Signature Version 4
        let scope = format!(
            "{}/{}/s3/aws4_request",
            &current_date,
            self.auth.region().name()
        );
        let string_to_sign = string_to_sign(
            &current_datetime,
            &scope,
            &sha256_digest_string(&canonical_request),
        );

        // 3. Calculate the signature for AWS Signature Version 4
        let signing_key = signature_key(
            self.auth.credentials().aws_secret_access_key(),
            &current_date,
            self.auth.region().name(),
            "s3",
        );
        let signature = sha256_hmac(signing_key.as_ref(), string_to_sign.as_bytes());

        // 4. Add the signature to the HTTP request
        let authorization_header = format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            self.auth.credentials().aws_access_key_id(),
            scope,
            signed_headers,
            write_hex_bytes(signature.as_ref())
        );
        self.add_header("authorization", &authorization_header);
        self.headers.clone()
    }

    pub fn add_header(&mut self, key: &str, value: &str) {
        self.headers
            .insert(key.to_ascii_lowercase(), value.trim().to_string());
    }
}

// CanonicalURI is the URI-encoded absolute path, every byte is encoded except the unreserved
// characters 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', '~' and the '/' separators
#[must_use]
pub fn canonical_uri(uri: &Url) -> String {
    const FRAGMENT: &AsciiSet = &NON_ALPHANUMERIC
        .remove(b'/')
        .remove(b'-')
        .remove(b'.')
        .remove(b'_')
        .remove(b'~');
    let path = percent_encoding::percent_decode_str(uri.path()).decode_utf8_lossy();
    utf8_percent_encode(&path, FRAGMENT).to_string()
}

// CanonicalQueryString: names and values URI-encoded individually, sorted by key name after
// encoding
#[must_use]
pub fn canonical_query_string(uri: &Url) -> String {
    const FRAGMENT: &AsciiSet = &NON_ALPHANUMERIC
        .remove(b'-')
        .remove(b'.')
        .remove(b'_')
        .remove(b'~');
    let mut pairs = uri
        .query_pairs()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(&key, FRAGMENT),
                utf8_percent_encode(&value, FRAGMENT)
            )
        })
        .collect::<Vec<String>>();
    pairs.sort();
    pairs.join("&")
}

fn canonical_headers(headers: &BTreeMap<String, String>) -> String {
    headers
        .iter()
        .map(|(key, value)| format!("{key}:{value}\n"))
        .collect()
}

// https://docs.aws.amazon.com/general/latest/gr/sigv4-create-string-to-sign.html
#[must_use]
pub fn string_to_sign(timestamp: &str, scope: &str, hashed_canonical_request: &str) -> String {
    format!("AWS4-HMAC-SHA256\n{timestamp}\n{scope}\n{hashed_canonical_request}")
}

fn signed_headers(headers: &BTreeMap<String, String>) -> String {
    headers.keys().map(String::as_str).collect::<Vec<_>>().join(";")
}

fn signature_key(secret_access_key: &str, date: &str, region: &str, service: &str) -> hmac::Tag {
    let k_date = sha256_hmac(
        format!("AWS4{secret_access_key}").as_bytes(),
        date.as_bytes(),
    );
    let k_region = sha256_hmac(k_date.as_ref(), region.as_bytes());
    let k_service = sha256_hmac(k_region.as_ref(), service.as_bytes());
    sha256_hmac(k_service.as_ref(), b"aws4_request")
}
