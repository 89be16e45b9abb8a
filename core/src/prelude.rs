use crate::api_interface::{PreviewFrame, Room};
use serde::Deserialize;
use std::future::Future;

/// Error surfaced by every remote call.
///
/// Transport failures, non-success statuses, and undecodable bodies all land
/// here with a human-readable message; callers that only care about "did it
/// work" can treat the variants identically.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl RequestError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Builds the error for a non-success response from its raw body.
    ///
    /// `{detail}` wins over `{error}`; when neither is present (or the body
    /// is not JSON at all) the message is the generic `HTTP <status>`.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| format!("HTTP {}", status));
        RequestError::Status { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        let detail = self.detail.and_then(|detail| match detail {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) => Some(text),
            // Validation errors arrive as a list of objects.
            other => Some(other.to_string()),
        });
        detail.or(self.error).filter(|text| !text.trim().is_empty())
    }
}

pub type RequestResult<T> = Result<T, RequestError>;

/// Result of a sub-fetch whose failure must not fail the enclosing cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum BestEffort<T> {
    Ready(T),
    Unavailable(RequestError),
}

impl<T> BestEffort<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            BestEffort::Ready(value) => Some(value),
            BestEffort::Unavailable(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, BestEffort::Ready(_))
    }
}

impl<T> From<RequestResult<T>> for BestEffort<T> {
    fn from(result: RequestResult<T>) -> Self {
        match result {
            Ok(value) => BestEffort::Ready(value),
            Err(err) => BestEffort::Unavailable(err),
        }
    }
}

/// The slice of the backend contract the poller needs.
///
/// `ApiClient` is the production implementation; tests plug in scripted
/// sources.
pub trait RoomSource: Send + Sync + 'static {
    fn list_rooms(&self) -> impl Future<Output = RequestResult<Vec<Room>>> + Send;
    fn get_room(&self, room_id: &str) -> impl Future<Output = RequestResult<Room>> + Send;
    fn preview(&self, room_id: &str) -> impl Future<Output = RequestResult<PreviewFrame>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_prefers_detail() {
        let err = RequestError::from_status(404, r#"{"detail":"Room not found","error":"x"}"#);
        assert_eq!(err.message(), "Room not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn status_error_falls_back_to_error_field() {
        let err = RequestError::from_status(500, r#"{"error":"boom"}"#);
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn status_error_without_body_uses_generic_message() {
        assert_eq!(RequestError::from_status(502, "").message(), "HTTP 502");
        assert_eq!(
            RequestError::from_status(503, "<html>down</html>").message(),
            "HTTP 503"
        );
        assert_eq!(RequestError::from_status(500, "{}").message(), "HTTP 500");
    }

    #[test]
    fn best_effort_keeps_value_or_drops_error() {
        let ok: BestEffort<u8> = Ok(3).into();
        assert_eq!(ok.into_option(), Some(3));
        let failed: BestEffort<u8> = Err(RequestError::Transport("refused".into())).into();
        assert!(!failed.is_ready());
        assert_eq!(failed.into_option(), None);
    }
}
