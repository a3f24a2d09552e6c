//! Normalized transaction response returned to the host platform.

use serde::{Deserialize, Serialize};

/// JSON object carried in a response body.
pub type ResponseBody = serde_json::Map<String, serde_json::Value>;

/// Result of a gateway operation, in the host platform's generic shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub body: ResponseBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl TransactionResponse {
    fn succeeded(message: &str, body: ResponseBody, authorization: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            body,
            authorization: Some(authorization.into()),
            error_code: None,
        }
    }

    pub(crate) fn approved(body: ResponseBody, authorization: impl Into<String>) -> Self {
        Self::succeeded("Transaction approved", body, authorization)
    }

    pub(crate) fn captured(body: ResponseBody, authorization: impl Into<String>) -> Self {
        Self::succeeded("Transaction captured", body, authorization)
    }

    pub(crate) fn voided(authorization: impl Into<String>) -> Self {
        Self::succeeded("Transaction voided", ResponseBody::new(), authorization)
    }

    pub(crate) fn refunded(body: ResponseBody, authorization: impl Into<String>) -> Self {
        Self::succeeded("Transaction refunded", body, authorization)
    }

    /// Provider reported failure. `status` is `None` when no HTTP reply arrived.
    pub(crate) fn error(body: ResponseBody, status: Option<u16>) -> Self {
        Self {
            success: false,
            message: "Transaction error".to_string(),
            body,
            authorization: None,
            error_code: status.map(|s| s.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_carries_status_as_code() {
        let resp = TransactionResponse::error(ResponseBody::new(), Some(422));
        assert!(!resp.success);
        assert_eq!(resp.message, "Transaction error");
        assert_eq!(resp.error_code.as_deref(), Some("422"));
        assert!(resp.authorization.is_none());
    }

    #[test]
    fn voided_has_empty_body() {
        let resp = TransactionResponse::voided("auth-1");
        assert!(resp.is_success());
        assert!(resp.body.is_empty());
        assert_eq!(resp.authorization.as_deref(), Some("auth-1"));
    }

    #[test]
    fn serialization_omits_absent_codes() {
        let resp = TransactionResponse::approved(ResponseBody::new(), "tok");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["authorization"], "tok");
        assert!(json.get("error_code").is_none());
    }
}
