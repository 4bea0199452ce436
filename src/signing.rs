//! # SigV4 request signing for AppSync.

use std::time::SystemTime;

use aws_credential_types::Credentials;
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningParams, SigningSettings};
use aws_sigv4::sign::v4;
use http::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use http::HeaderMap;

use crate::errors::Error;

pub const SERVICE_NAME: &str = "appsync";
pub const JSON: &str = "application/json";

/// Produces the full header set for a POST of `body` to `url`.
///
/// The result carries `Accept`, `Content-Type` and the SigV4 headers
/// (`Authorization`, `X-Amz-Date`, plus `X-Amz-Security-Token` when the
/// credentials include a session token).
pub fn signed_headers(
    credentials: &Credentials,
    region: &str,
    url: &str,
    body: &[u8],
    time: SystemTime,
) -> Result<HeaderMap, Error> {
    let base = [("accept", JSON), ("content-type", JSON)];

    let identity = credentials.clone().into();
    let params: SigningParams = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(SERVICE_NAME)
        .time(time)
        .settings(SigningSettings::default())
        .build()
        .map_err(|e| Error::Signing(e.to_string()))?
        .into();

    let signable = SignableRequest::new(
        "POST",
        url,
        base.iter().copied(),
        SignableBody::Bytes(body),
    )?;
    let (instructions, _signature) = sign(signable, &params)?.into_parts();

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(JSON));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
    for (name, value) in instructions.headers() {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::Signing(format!("bad header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::Signing(format!("bad header value for {}: {}", name, e)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
