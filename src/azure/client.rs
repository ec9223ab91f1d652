//! Azure Resource Manager client implementation.
//!
//! This module provides the HTTP client used to look up resource IDs. It
//! authenticates with a bearer token borrowed from the Azure CLI session, or
//! taken verbatim from `ARM_ACCESS_TOKEN`.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, trace};

use crate::error::{AzureError, Result, TfImportError};

use super::lookup::ResourceLookup;
use super::types::{ArmResource, LookupRequest};

/// Public Azure Resource Manager endpoint.
pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// Azure CLI executable. On Windows it is a batch wrapper.
const AZ_PROGRAM: &str = if cfg!(windows) { "az.cmd" } else { "az" };

/// Where the ARM access token comes from.
#[derive(Clone)]
pub enum TokenSource {
    /// `az account get-access-token` for the current CLI login.
    AzureCli,
    /// A token obtained by other means.
    Static(String),
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AzureCli => write!(f, "AzureCli"),
            Self::Static(_) => write!(f, "Static(<redacted>)"),
        }
    }
}

/// Azure Resource Manager client.
pub struct AzureClient {
    /// HTTP client.
    client: Client,
    /// Base URL, without trailing slash.
    endpoint: String,
    /// Token source.
    source: TokenSource,
    /// Azure CLI executable.
    cli_program: String,
    /// Token fetched on first use. A failure is kept too, so a missing login
    /// is reported once instead of once per lookup.
    token: OnceCell<std::result::Result<String, String>>,
    /// Base delay between retries.
    retry_delay: Duration,
}

/// ARM error body.
#[derive(Debug, serde::Deserialize)]
struct ArmErrorResponse {
    error: ArmErrorDetail,
}

/// ARM error detail.
#[derive(Debug, serde::Deserialize)]
struct ArmErrorDetail {
    code: String,
    message: String,
}

impl AzureClient {
    /// Creates a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(endpoint: &str, source: TokenSource, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AzureError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            source,
            cli_program: String::from(AZ_PROGRAM),
            token: OnceCell::new(),
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        })
    }

    /// Sets the base delay between retries.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    #[cfg(test)]
    fn with_cli_program(mut self, program: impl Into<String>) -> Self {
        self.cli_program = program.into();
        self
    }

    /// Returns the access token, fetching it on first use.
    async fn token(&self) -> Result<&str> {
        let token = self
            .token
            .get_or_init(|| async {
                match &self.source {
                    TokenSource::Static(token) => Ok(token.clone()),
                    TokenSource::AzureCli => self.cli_token().await,
                }
            })
            .await;

        token.as_deref().map_err(|message| {
            AzureError::CredentialUnavailable {
                message: message.clone(),
            }
            .into()
        })
    }

    /// Asks the Azure CLI for a token for this endpoint.
    async fn cli_token(&self) -> std::result::Result<String, String> {
        debug!("Requesting ARM access token from the Azure CLI");

        let resource = format!("{}/", self.endpoint);
        let output = Command::new(&self.cli_program)
            .args([
                "account",
                "get-access-token",
                "--resource",
                &resource,
                "--query",
                "accessToken",
                "-o",
                "tsv",
            ])
            .output()
            .await
            .map_err(|e| format!("failed to run `{}`: {e}", self.cli_program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "`az account get-access-token` failed: {}",
                stderr.trim()
            ));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(String::from("`az account get-access-token` returned no token"));
        }

        Ok(token)
    }

    /// Performs a lookup, retrying transient failures.
    async fn get(&self, request: &LookupRequest) -> Result<Option<ArmResource>> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = last_error
                    .as_ref()
                    .and_then(TfImportError::retry_delay_secs)
                    .map_or(self.retry_delay * attempt, Duration::from_secs);
                debug!("Retry attempt {attempt} of {MAX_RETRIES} in {delay:?}");
                tokio::time::sleep(delay).await;
            }

            match self.get_once(request).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| AzureError::network("Max retries exceeded").into()))
    }

    /// Performs a single lookup.
    async fn get_once(&self, request: &LookupRequest) -> Result<Option<ArmResource>> {
        let url = format!("{}{}", self.endpoint, request.path);
        trace!("GET {url}?api-version={}", request.api_version);

        let token = self.token().await?;
        let response = self
            .client
            .get(&url)
            .query(&[("api-version", request.api_version)])
            .header(header::ACCEPT, "application/json")
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AzureError::network(format!("Request failed: {e}")))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!("Not found: {}", request.path);
            return Ok(None);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(1);

            return Err(AzureError::RateLimited {
                retry_after_secs: retry_after,
            }
            .into());
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(AzureError::AuthenticationFailed {
                message: error_message(&body),
            }
            .into());
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AzureError::api_error(status.as_u16(), error_message(&body)).into());
        }

        let resource: ArmResource = response.json().await.map_err(|e| AzureError::InvalidResponse {
            message: format!("Failed to parse response: {e}"),
        })?;

        Ok(Some(resource))
    }
}

#[async_trait]
impl ResourceLookup for AzureClient {
    async fn resource_id(&self, request: &LookupRequest) -> Result<Option<String>> {
        Ok(self.get(request).await?.map(|resource| resource.id))
    }
}

/// Extracts `code: message` from an ARM error body, or returns the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ArmErrorResponse>(body).map_or_else(
        |_| body.trim().to_string(),
        |parsed| format!("{}: {}", parsed.error.code, parsed.error.message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DISK_PATH: &str =
        "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.Compute/disks/disk1";

    fn disk_request() -> LookupRequest {
        LookupRequest {
            path: DISK_PATH.to_string(),
            api_version: "2023-01-02",
        }
    }

    fn client(server: &MockServer) -> AzureClient {
        AzureClient::new(&server.uri(), TokenSource::Static(String::from("t0ken")), 5)
            .unwrap()
            .with_retry_delay(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_found_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DISK_PATH))
            .and(query_param("api-version", "2023-01-02"))
            .and(header("authorization", "Bearer t0ken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.Compute/disks/disk1",
                "name": "disk1",
                "location": "westeurope"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server).resource_id(&disk_request()).await.unwrap();
        assert_eq!(id.as_deref(), Some(DISK_PATH));
    }

    #[tokio::test]
    async fn test_not_found_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DISK_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "ResourceNotFound", "message": "gone"}
            })))
            .mount(&server)
            .await;

        let id = client(&server).resource_id(&disk_request()).await.unwrap();
        assert!(id.is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"code": "InvalidAuthenticationToken", "message": "expired"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).resource_id(&disk_request()).await.unwrap_err();
        match err {
            TfImportError::Azure(AzureError::AuthenticationFailed { message }) => {
                assert_eq!(message, "InvalidAuthenticationToken: expired");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .expect(u64::from(MAX_RETRIES))
            .mount(&server)
            .await;

        let err = client(&server).resource_id(&disk_request()).await.unwrap_err();
        assert!(matches!(
            err,
            TfImportError::Azure(AzureError::ApiRequestFailed { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_retry_then_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "/x"})))
            .mount(&server)
            .await;

        let id = client(&server).resource_id(&disk_request()).await.unwrap();
        assert_eq!(id.as_deref(), Some("/x"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cli_token_failure_is_cached() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let calls = dir.path().join("calls");
        let script = dir.path().join("az");
        std::fs::write(
            &script,
            format!("#!/bin/sh\necho call >> '{}'\necho 'Please run az login' >&2\nexit 1\n", calls.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "/x"})))
            .expect(0)
            .mount(&server)
            .await;

        let client = AzureClient::new(&server.uri(), TokenSource::AzureCli, 5)
            .unwrap()
            .with_cli_program(script.display().to_string());

        for _ in 0..3 {
            let err = client.resource_id(&disk_request()).await.unwrap_err();
            match err {
                TfImportError::Azure(AzureError::CredentialUnavailable { message }) => {
                    assert!(message.contains("az login"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        let spawned = std::fs::read_to_string(&calls).unwrap();
        assert_eq!(spawned.lines().count(), 1);
    }

    #[test]
    fn test_error_message_fallback() {
        assert_eq!(error_message("  plain  "), "plain");
        assert_eq!(
            error_message(r#"{"error": {"code": "C", "message": "m"}}"#),
            "C: m"
        );
    }

    #[test]
    fn test_token_source_debug_redacts() {
        let debug = format!("{:?}", TokenSource::Static(String::from("secret")));
        assert!(!debug.contains("secret"));
    }
}
