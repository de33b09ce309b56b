//! Error types for rJMX-Probe
//!
//! This module defines the error types used throughout the application.

use thiserror::Error;

/// Application error type
///
/// The variant determines the failure boundary: every `ProbeError` is
/// fatal for the run and aborts before any metric output is produced.
/// Recovered item-level failures never surface here; they are counted
/// into the metric table instead.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Failure establishing the management session
    #[error("Connection error: {0}")]
    Connection(String),

    /// Collector error (failed group-level query)
    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),
}

/// Collector 모듈 에러 타입
#[derive(Error, Debug)]
pub enum CollectorError {
    /// HTTP 클라이언트 초기화 실패
    #[error("Failed to initialize HTTP client: {0}")]
    HttpClientInit(#[source] reqwest::Error),

    /// HTTP 요청 실패
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[source] reqwest::Error),

    /// HTTP 응답 읽기 실패
    #[error("Failed to read HTTP response: {0}")]
    HttpResponse(#[source] reqwest::Error),

    /// HTTP 상태 코드 에러
    #[error("HTTP error status: {0}")]
    HttpStatus(u16),

    /// JSON 파싱 에러
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Jolokia 에러 응답
    #[error("Jolokia error (status {status}): {message}")]
    JolokiaError { status: u16, message: String },

    /// MBean을 찾을 수 없음
    #[error("MBean not found: {0}")]
    MBeanNotFound(String),

    /// 잘못된 ObjectName
    #[error("Invalid ObjectName: {0}")]
    InvalidObjectName(String),

    /// 권한 부족 (개별 항목 조회 실패, 복구 가능)
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// 응답 값의 형태가 예상과 다름
    #[error("Unexpected value shape for {mbean}: {detail}")]
    UnexpectedValue { mbean: String, detail: String },

    /// 타임아웃
    /// The value is the configured timeout in milliseconds, if known.
    #[error("Request timed out{}", .0.map(|ms| format!(" after {}ms", ms)).unwrap_or_default())]
    Timeout(Option<u64>),

    /// 연결 실패
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// 인증 실패
    #[error("Authentication failed")]
    AuthenticationFailed,
}

impl CollectorError {
    /// 개별 항목 단위로 복구 가능한 에러인지 확인
    ///
    /// Permission failures on a single discovered instance are counted
    /// and skipped; everything else aborts the enclosing group.
    pub fn is_item_recoverable(&self) -> bool {
        matches!(self, CollectorError::AccessDenied(_))
    }

    /// HTTP 상태 코드 추출
    pub fn http_status(&self) -> Option<u16> {
        match self {
            CollectorError::HttpStatus(code) => Some(*code),
            CollectorError::JolokiaError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CollectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // Timeout value is unknown when converting from reqwest::Error
            // because reqwest API doesn't expose the configured timeout duration.
            // Use CollectorError::timeout_with_duration() when the duration is known.
            CollectorError::Timeout(None)
        } else if err.is_connect() {
            CollectorError::ConnectionFailed(err.to_string())
        } else if err.is_request() {
            CollectorError::HttpRequest(err)
        } else {
            CollectorError::HttpResponse(err)
        }
    }
}

impl CollectorError {
    /// Create a Timeout error with known duration
    pub fn timeout_with_duration(ms: u64) -> Self {
        CollectorError::Timeout(Some(ms))
    }
}

/// Result type alias for application errors
pub type ProbeResult<T> = Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_is_item_recoverable() {
        let err = CollectorError::AccessDenied("getThreadInfo".to_string());
        assert!(err.is_item_recoverable());

        let err = CollectorError::HttpStatus(500);
        assert!(!err.is_item_recoverable());
    }

    #[test]
    fn test_http_status_extraction() {
        assert_eq!(CollectorError::HttpStatus(502).http_status(), Some(502));
        assert_eq!(
            CollectorError::JolokiaError {
                status: 404,
                message: "not found".to_string()
            }
            .http_status(),
            Some(404)
        );
        assert_eq!(CollectorError::Timeout(None).http_status(), None);
    }

    #[test]
    fn test_timeout_message_includes_duration() {
        let err = CollectorError::timeout_with_duration(5000);
        assert!(err.to_string().contains("5000ms"));
    }
}
