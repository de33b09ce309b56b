//! Jolokia HTTP 클라이언트
//!
//! 단발성 프로브를 위한 동기적 순차 호출 클라이언트입니다. 요청당
//! 타임아웃은 설정에서 명시적으로 지정됩니다.

use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use super::parser::{parse_response, CollectResult, JolokiaResponse};
use crate::error::CollectorError;

/// Jolokia HTTP 클라이언트
#[derive(Clone)]
pub struct JolokiaClient {
    client: Client,
    base_url: String,
    timeout_ms: u64,
    auth: Option<(String, String)>,
}

/// Jolokia 요청 구조체
#[derive(Debug, Serialize)]
struct JolokiaRequest {
    #[serde(rename = "type")]
    request_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mbean: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    arguments: Option<Vec<Value>>,
}

impl JolokiaRequest {
    fn read(mbean: &str, attribute: Option<&str>) -> Self {
        Self {
            request_type: "read".to_string(),
            mbean: Some(mbean.to_string()),
            attribute: attribute.map(|a| a.to_string()),
            operation: None,
            arguments: None,
        }
    }

    fn exec(mbean: &str, operation: &str, arguments: Vec<Value>) -> Self {
        Self {
            request_type: "exec".to_string(),
            mbean: Some(mbean.to_string()),
            attribute: None,
            operation: Some(operation.to_string()),
            arguments: Some(arguments),
        }
    }

    fn list() -> Self {
        Self {
            request_type: "list".to_string(),
            mbean: None,
            attribute: None,
            operation: None,
            arguments: None,
        }
    }

    fn version() -> Self {
        Self {
            request_type: "version".to_string(),
            mbean: None,
            attribute: None,
            operation: None,
            arguments: None,
        }
    }
}

impl JolokiaClient {
    /// 새 클라이언트 생성
    ///
    /// # Arguments
    /// * `base_url` - Jolokia 엔드포인트 URL (예: "http://localhost:8778/jolokia")
    /// * `timeout_ms` - 요청당 타임아웃 (밀리초)
    pub fn new(base_url: &str, timeout_ms: u64) -> CollectResult<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(CollectorError::HttpClientInit)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms,
            auth: None,
        })
    }

    /// Basic Auth 설정
    pub fn with_auth(mut self, username: &str, password: &str) -> Self {
        self.auth = Some((username.to_string(), password.to_string()));
        self
    }

    async fn post(&self, request: &JolokiaRequest) -> CollectResult<JolokiaResponse> {
        let mut req = self.client.post(&self.base_url).json(request);

        if let Some((username, password)) = &self.auth {
            req = req.basic_auth(username, Some(password));
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                CollectorError::timeout_with_duration(self.timeout_ms)
            } else {
                CollectorError::from(e)
            }
        })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(CollectorError::AuthenticationFailed);
        }
        if !status.is_success() {
            return Err(CollectorError::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(CollectorError::HttpResponse)?;

        parse_response(&body)
    }

    /// 단일 MBean 속성 조회
    #[instrument(skip(self), fields(mbean = %mbean))]
    pub async fn read_attribute(
        &self,
        mbean: &str,
        attribute: Option<&str>,
    ) -> CollectResult<JolokiaResponse> {
        debug!("Sending Jolokia read request");
        self.post(&JolokiaRequest::read(mbean, attribute)).await
    }

    /// MBean 오퍼레이션 실행
    #[instrument(skip(self, arguments), fields(mbean = %mbean, operation = %operation))]
    pub async fn exec_operation(
        &self,
        mbean: &str,
        operation: &str,
        arguments: Vec<Value>,
    ) -> CollectResult<JolokiaResponse> {
        debug!("Sending Jolokia exec request");
        self.post(&JolokiaRequest::exec(mbean, operation, arguments))
            .await
    }

    /// 전체 MBean 카탈로그 조회 (list)
    #[instrument(skip(self))]
    pub async fn list_mbeans(&self) -> CollectResult<JolokiaResponse> {
        debug!("Sending Jolokia list request");
        self.post(&JolokiaRequest::list()).await
    }

    /// 엔드포인트 연결 확인 (version)
    ///
    /// Transport and auth failures surface here, before any metric
    /// query is issued.
    #[instrument(skip(self))]
    pub async fn check_version(&self) -> CollectResult<()> {
        let response = self.post(&JolokiaRequest::version()).await?;
        if response.status != 200 {
            return Err(CollectorError::JolokiaError {
                status: response.status,
                message: response
                    .error
                    .unwrap_or_else(|| "version request failed".to_string()),
            });
        }
        Ok(())
    }
}
