// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Eskiz SMS gateway.
//!
//! Provides [`EskizClient`] which handles bearer-token authentication,
//! multipart request construction, and transient error retry. The auth token
//! is cached inside the client and refreshed when it expires or the gateway
//! answers 401.

use std::time::{Duration, Instant};

use edusms_core::EduSmsError;
use reqwest::multipart::Form;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::types::{ApiErrorResponse, LoginResponse, SendResponse};

const LOGIN_PATH: &str = "/api/auth/login";
const SEND_PATH: &str = "/api/message/sms/send";

/// Account credentials for the login endpoint.
#[derive(Debug)]
pub struct EskizCredentials {
    pub email: String,
    pub password: SecretString,
}

/// How many times a send is attempted and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

struct CachedToken {
    token: SecretString,
    expires_at: Instant,
}

/// HTTP client for Eskiz API communication.
pub struct EskizClient {
    http: reqwest::Client,
    base_url: String,
    credentials: EskizCredentials,
    sender: String,
    token_ttl: Duration,
    retry: RetryPolicy,
    token: Mutex<Option<CachedToken>>,
}

impl EskizClient {
    /// Creates a new client. No request is made until the first send.
    pub fn new(
        base_url: &str,
        credentials: EskizCredentials,
        sender: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, EduSmsError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| EduSmsError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            sender: sender.into(),
            token_ttl: Duration::from_secs(29 * 24 * 60 * 60),
            retry: RetryPolicy::default(),
            token: Mutex::new(None),
        })
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Send one SMS. `phone` may carry a leading `+`; it is stripped.
    ///
    /// The first 401 drops the cached token, logs in again and resends once;
    /// this does not count against the retry policy. A second 401 fails.
    /// Only failures where the gateway cannot have accepted the message are
    /// retried (connect errors, 429, 503); timeouts and other 5xx fail at
    /// once so a delivered message is never sent twice.
    pub async fn send_sms(&self, phone: &str, message: &str) -> Result<SendResponse, EduSmsError> {
        let mobile_phone = phone.trim().trim_start_matches('+').to_string();
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        let mut reauthenticated = false;

        loop {
            let token = self.token().await?;
            let form = Form::new()
                .text("mobile_phone", mobile_phone.clone())
                .text("message", message.to_string())
                .text("from", self.sender.clone());

            let response = match self
                .http
                .post(format!("{}{SEND_PATH}", self.base_url))
                .bearer_auth(token.expose_secret())
                .multipart(form)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    let retryable = e.is_connect();
                    warn!(attempt, retryable, error = %e, "sms request failed");
                    let err = EduSmsError::SendFailed {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    };
                    if retryable && attempt < max_attempts {
                        attempt += 1;
                        tokio::time::sleep(self.retry.backoff).await;
                        continue;
                    }
                    return Err(err);
                }
            };

            let status = response.status();
            debug!(status = %status, attempt, "send response received");

            if status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let parsed: SendResponse = serde_json::from_str(&body).unwrap_or_default();
                debug!(id = ?parsed.id, vendor_status = ?parsed.status, "sms accepted");
                return Ok(parsed);
            }

            let body = response.text().await.unwrap_or_default();

            if status == StatusCode::UNAUTHORIZED {
                if reauthenticated {
                    return Err(send_failed(status, &body));
                }
                warn!(attempt, "token rejected, re-authenticating");
                self.invalidate_token().await;
                reauthenticated = true;
                continue;
            }

            if is_retryable_status(status) && attempt < max_attempts {
                warn!(status = %status, attempt, body = %body, "gateway busy, will retry");
                attempt += 1;
                tokio::time::sleep(self.retry.backoff).await;
                continue;
            }

            return Err(send_failed(status, &body));
        }
    }

    /// Log in and cache a token, returning whether it succeeded.
    pub async fn authenticate(&self) -> Result<(), EduSmsError> {
        self.token().await.map(|_| ())
    }

    async fn invalidate_token(&self) {
        self.token.lock().await.take();
    }

    /// The cached token, logging in first when it is missing or expired.
    ///
    /// The lock is held across the login so concurrent senders share one.
    async fn token(&self) -> Result<SecretString, EduSmsError> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(SecretString::from(cached.token.expose_secret()));
            }
            debug!("cached token expired");
        }

        let token = self.login().await?;
        let handle = SecretString::from(token.expose_secret());
        *guard = Some(CachedToken {
            token,
            expires_at: Instant::now() + self.token_ttl,
        });
        Ok(handle)
    }

    async fn login(&self) -> Result<SecretString, EduSmsError> {
        let form = Form::new()
            .text("email", self.credentials.email.clone())
            .text(
                "password",
                self.credentials.password.expose_secret().to_string(),
            );

        let response = self
            .http
            .post(format!("{}{LOGIN_PATH}", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| EduSmsError::SendFailed {
                message: format!("login request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(EduSmsError::SendFailed {
                message: format!("authentication failed ({status}): {body}"),
                source: None,
            });
        }

        let parsed: LoginResponse =
            serde_json::from_str(&body).map_err(|e| EduSmsError::SendFailed {
                message: format!("failed to parse login response: {e}"),
                source: Some(Box::new(e)),
            })?;
        info!("eskiz token refreshed");
        Ok(SecretString::from(parsed.data.token))
    }
}

fn send_failed(status: StatusCode, body: &str) -> EduSmsError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!(
            "Eskiz API error ({status}, {}): {}",
            api_err.status.as_deref().unwrap_or("error"),
            api_err.message
        ),
        Err(_) => format!("Eskiz returned {status}: {body}"),
    };
    EduSmsError::SendFailed {
        message,
        source: None,
    }
}

/// Statuses where the gateway refused the request before accepting it.
fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 503)
}
