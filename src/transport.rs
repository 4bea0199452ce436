//! # Outbound transport to the AppSync endpoint.

use std::time::SystemTime;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use http::HeaderMap;
use reqwest::Url;
use tracing::{debug, instrument};

use crate::errors::Error;
use crate::graphql::{GraphqlRequest, GraphqlResponse};
use crate::signing::signed_headers;

/// Sends one GraphQL request and returns the decoded envelope.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &GraphqlRequest) -> Result<GraphqlResponse, Error>;
}

/// HTTPS transport that signs every request with SigV4.
///
/// Credentials are pulled from the provider on each call, so a refreshed
/// session is picked up without rebuilding the transport.
pub struct SignedHttpTransport {
    http: reqwest::Client,
    endpoint: Url,
    region: String,
    credentials: SharedCredentialsProvider,
}

impl SignedHttpTransport {
    pub fn new(
        http: reqwest::Client,
        endpoint: Url,
        region: impl Into<String>,
        credentials: SharedCredentialsProvider,
    ) -> Self {
        SignedHttpTransport {
            http,
            endpoint,
            region: region.into(),
            credentials,
        }
    }

    pub fn from_sdk_config(endpoint: Url, sdk_config: &SdkConfig) -> Result<Self, Error> {
        let region = sdk_config
            .region()
            .ok_or_else(|| Error::config("no AWS region could be resolved"))?
            .to_string();
        let credentials = sdk_config
            .credentials_provider()
            .ok_or_else(|| Error::config("no AWS credentials provider is configured"))?;

        Ok(SignedHttpTransport::new(
            reqwest::Client::new(),
            endpoint,
            region,
            credentials,
        ))
    }

    /// Serializes `request` and signs it with freshly resolved credentials.
    async fn sign(&self, request: &GraphqlRequest) -> Result<(HeaderMap, Vec<u8>), Error> {
        let credentials = self.credentials.provide_credentials().await?;
        let body = serde_json::to_vec(request)?;
        let headers = signed_headers(
            &credentials,
            &self.region,
            self.endpoint.as_str(),
            &body,
            SystemTime::now(),
        )?;
        Ok((headers, body))
    }
}

#[async_trait]
impl Transport for SignedHttpTransport {
    #[instrument(skip(self, request), fields(operation = ?request.operation_name))]
    async fn execute(&self, request: &GraphqlRequest) -> Result<GraphqlResponse, Error> {
        let (headers, body) = self.sign(request).await?;

        let response = self
            .http
            .post(self.endpoint.clone())
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        debug!("endpoint answered {}", status);

        decode_response(status.as_u16(), &bytes)
    }
}

/// Non-2xx answers are still decoded when they carry a GraphQL error
/// envelope, which is how AppSync reports rejected signatures.
fn decode_response(status: u16, body: &[u8]) -> Result<GraphqlResponse, Error> {
    let success = (200..300).contains(&status);
    match serde_json::from_slice::<GraphqlResponse>(body) {
        Ok(envelope) if success || envelope.has_errors() => Ok(envelope),
        Err(err) if success => Err(err.into()),
        _ => Err(Error::Http {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        }),
    }
}
