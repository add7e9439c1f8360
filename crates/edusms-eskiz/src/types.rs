// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Eskiz API response types.

use serde::Deserialize;

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub data: LoginData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub token: String,
}

/// Body of a successful `POST /api/message/sms/send`.
///
/// Every field is optional; a 2xx status alone means the gateway accepted
/// the message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_parses() {
        let body = r#"{"message":"token_generated","data":{"token":"abc.def"},"token_type":"bearer"}"#;
        let parsed: LoginResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.token, "abc.def");
    }

    #[test]
    fn send_response_tolerates_missing_fields() {
        let parsed: SendResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.id.is_none());
        let parsed: SendResponse = serde_json::from_str(
            r#"{"id":"4385062f","message":"Waiting for SMS provider","status":"waiting"}"#,
        )
        .unwrap();
        assert_eq!(parsed.status.as_deref(), Some("waiting"));
    }
}
