//! Interactive sign-in through the OAuth 2.0 device authorization grant.
//!
//! Every call starts a fresh login; nothing is read from or written to a
//! token cache, so the user is always prompted.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use azure_core::time::{Duration as TokenDuration, OffsetDateTime};
use serde::Deserialize;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use super::AccessTokenCredential;
use crate::error::{Error, Result};

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCodeResponse {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub expires_in: u64,
    #[serde(default = "default_interval")]
    pub interval: u64,
    pub message: String,
}

fn default_interval() -> u64 {
    5
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug)]
enum PollOutcome {
    Token { access_token: String, expires_in: i64 },
    Pending,
    SlowDown,
}

fn classify(success: bool, body: &[u8]) -> Result<PollOutcome> {
    if success {
        let token: TokenResponse = serde_json::from_slice(body)?;
        return Ok(PollOutcome::Token {
            access_token: token.access_token,
            expires_in: token.expires_in,
        });
    }
    let err: TokenErrorResponse = serde_json::from_slice(body)
        .map_err(|_| Error::Auth(String::from_utf8_lossy(body).into_owned()))?;
    match err.error.as_str() {
        "authorization_pending" => Ok(PollOutcome::Pending),
        "slow_down" => Ok(PollOutcome::SlowDown),
        _ => Err(Error::Auth(match err.error_description {
            Some(description) => format!("{}: {}", err.error, description),
            None => err.error,
        })),
    }
}

#[derive(Debug, Clone)]
pub struct DeviceCodeFlow {
    http: reqwest::Client,
    authority: String,
    client_id: String,
    scope: String,
}

impl DeviceCodeFlow {
    pub fn new(authority_host: &str, tenant_id: &str, client_id: &str, scope: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            authority: format!("{}/{}", authority_host.trim_end_matches('/'), tenant_id),
            client_id: client_id.to_string(),
            scope: scope.to_string(),
        }
    }

    pub async fn start(&self) -> Result<DeviceCodeResponse> {
        let url = format!("{}/oauth2/v2.0/devicecode", self.authority);
        debug!(%url, "requesting device code");
        let resp = self
            .http
            .post(&url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            return Err(Error::Auth(format!(
                "device code request failed ({status}): {}",
                String::from_utf8_lossy(&body)
            )));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn poll_once(&self, device_code: &str) -> Result<PollOutcome> {
        let url = format!("{}/oauth2/v2.0/token", self.authority);
        let resp = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", DEVICE_CODE_GRANT),
                ("client_id", self.client_id.as_str()),
                ("device_code", device_code),
            ])
            .send()
            .await?;
        let success = resp.status().is_success();
        let body = resp.bytes().await?;
        classify(success, &body)
    }

    /// Waits until the user finishes signing in, or the code expires.
    pub async fn wait_for_token(
        &self,
        code: &DeviceCodeResponse,
    ) -> Result<Arc<AccessTokenCredential>> {
        let deadline = Instant::now() + Duration::from_secs(code.expires_in);
        let mut interval = Duration::from_secs(code.interval.max(1));
        loop {
            sleep(interval).await;
            match self.poll_once(&code.device_code).await? {
                PollOutcome::Token {
                    access_token,
                    expires_in,
                } => {
                    info!("signed in");
                    let expires_on =
                        OffsetDateTime::now_utc() + TokenDuration::seconds(expires_in);
                    return Ok(AccessTokenCredential::new(access_token, expires_on));
                }
                PollOutcome::Pending => {}
                PollOutcome::SlowDown => interval += Duration::from_secs(5),
            }
            if Instant::now() >= deadline {
                return Err(Error::Auth("device code expired".to_string()));
            }
        }
    }

    /// Runs the whole flow, writing the sign-in instructions to `out`.
    pub async fn login<W: Write>(&self, out: &mut W) -> Result<Arc<AccessTokenCredential>> {
        let code = self.start().await?;
        writeln!(out, "{}", code.message)?;
        out.flush()?;
        self.wait_for_token(&code).await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn token_response_is_accepted() {
        let body = br#"{"token_type":"Bearer","access_token":"tok","expires_in":3599}"#;
        match classify(true, body).unwrap() {
            PollOutcome::Token {
                access_token,
                expires_in,
            } => {
                assert_eq!(access_token, "tok");
                assert_eq!(expires_in, 3599);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn pending_and_slow_down_keep_polling() {
        let pending = br#"{"error":"authorization_pending"}"#;
        assert!(matches!(classify(false, pending).unwrap(), PollOutcome::Pending));
        let slow = br#"{"error":"slow_down","error_description":"wait"}"#;
        assert!(matches!(classify(false, slow).unwrap(), PollOutcome::SlowDown));
    }

    #[test]
    fn declined_login_fails() {
        let body = br#"{"error":"access_denied","error_description":"the user declined"}"#;
        let err = classify(false, body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "authentication failed: access_denied: the user declined"
        );
        assert!(matches!(classify(false, b"<html>"), Err(Error::Auth(_))));
    }

    #[test]
    fn device_code_interval_defaults() {
        let body = br#"{"device_code":"d","user_code":"U","verification_uri":"https://microsoft.com/devicelogin","expires_in":900,"message":"Go sign in"}"#;
        let code: DeviceCodeResponse = serde_json::from_slice(body).unwrap();
        assert_eq!(code.interval, 5);
        assert_eq!(code.user_code, "U");
    }

    #[test]
    fn authority_joins_host_and_tenant() {
        let flow = DeviceCodeFlow::new(
            "https://login.microsoftonline.com/",
            "contoso",
            "client",
            "https://management.azure.com/.default",
        );
        assert_eq!(flow.authority, "https://login.microsoftonline.com/contoso");
    }
}
