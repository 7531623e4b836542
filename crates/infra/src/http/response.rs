//! Buffered response

use gatehouse_domain::ApiError;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

/// Successful response with its body fully read
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, headers: HeaderMap::new(), body: body.into() }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body. An empty body (204/205) reads as JSON `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let parsed = if self.body.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_value(serde_json::Value::Null)
        } else {
            serde_json::from_slice(&self.body)
        };
        parsed.map_err(|err| {
            ApiError::local(format!("failed to parse response ({}): {err}", self.status))
        })
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    #[test]
    fn parses_json_body() {
        let response = ApiResponse::new(200, br#"{"id":7}"#.to_vec());
        assert_eq!(response.json::<Item>().unwrap(), Item { id: 7 });
    }

    #[test]
    fn empty_body_reads_as_null() {
        let response = ApiResponse::new(204, Vec::new());
        assert_eq!(response.json::<Option<Item>>().unwrap(), None);
        assert!(response.json::<Item>().is_err());
    }

    #[test]
    fn malformed_body_is_a_local_error() {
        let err = ApiResponse::new(200, b"<html>".to_vec()).json::<Item>().unwrap_err();
        assert_eq!(err.code, 0);
        assert!(err.message.contains("failed to parse response"));
    }
}
