use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub reason: String,
}

/// Error body returned by the item store: `{ "error": { "reason": "..." } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ErrorDetail,
}

impl ApiError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                reason: reason.into(),
            },
        }
    }

    pub fn reason(&self) -> &str {
        &self.error.reason
    }

    /// Pulls `error.reason` out of a raw response body, if it has that shape.
    pub fn reason_from_body(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ApiError>(body)
            .ok()
            .map(|api_error| api_error.error.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_nested_reason() {
        let body = br#"{"error":{"reason":"duplicate uid","code":11000}}"#;
        assert_eq!(
            ApiError::reason_from_body(body).as_deref(),
            Some("duplicate uid")
        );
    }

    #[test]
    fn rejects_bodies_without_nested_reason() {
        assert_eq!(ApiError::reason_from_body(br#"{"message":"nope"}"#), None);
        assert_eq!(ApiError::reason_from_body(br#"{"error":"flat"}"#), None);
        assert_eq!(ApiError::reason_from_body(b"<html>502</html>"), None);
        assert_eq!(ApiError::reason_from_body(b""), None);
    }
}
