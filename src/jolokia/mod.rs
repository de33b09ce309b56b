//! Jolokia 원격 관리 엔드포인트 통신 모듈
//!
//! Java 애플리케이션의 Jolokia 엔드포인트에 대한 HTTP 요청과
//! 응답 파싱을 담당합니다.
//!
//! # Example
//!
//! ```ignore
//! use rjmx_probe::jolokia::JolokiaClient;
//!
//! let client = JolokiaClient::new("http://localhost:8778/jolokia", 5000)?;
//! let response = client.read_attribute("java.lang:type=Memory", None).await?;
//! ```

mod client;
mod parser;

pub use client::JolokiaClient;
pub use parser::{
    parse_response, AttributeValue, CollectResult, JolokiaResponse, MBeanValue, ObjectName,
};
