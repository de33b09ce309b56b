//! Jolokia JSON 응답 파서
//!
//! Jolokia API 응답을 파싱하여 내부 데이터 구조로 변환합니다.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::CollectorError;

/// Collector 작업 결과 타입
pub type CollectResult<T> = Result<T, CollectorError>;

/// Jolokia API 응답 구조체
#[derive(Debug, Clone)]
pub struct JolokiaResponse {
    /// 응답 값
    pub value: MBeanValue,
    /// 응답 상태 코드
    pub status: u16,
    /// 에러 메시지 (실패 시)
    pub error: Option<String>,
    /// 에러 타입 (실패 시)
    pub error_type: Option<String>,
}

impl JolokiaResponse {
    /// 성공 응답이면 값을, 에러 응답이면 상태에 맞는 에러를 반환
    ///
    /// A `SecurityException` from the remote side maps to
    /// `AccessDenied` so callers can recover per item.
    pub fn into_value(self, mbean: &str) -> CollectResult<MBeanValue> {
        if self.status == 200 {
            return Ok(self.value);
        }
        let message = self.error.unwrap_or_else(|| "unknown error".to_string());
        if let Some(error_type) = &self.error_type {
            if error_type.contains("SecurityException") {
                return Err(CollectorError::AccessDenied(message));
            }
            if error_type.contains("InstanceNotFoundException") {
                return Err(CollectorError::MBeanNotFound(mbean.to_string()));
            }
        }
        Err(CollectorError::JolokiaError {
            status: self.status,
            message,
        })
    }
}

/// MBean 값 - 다양한 형태를 지원
#[derive(Debug, Clone)]
pub enum MBeanValue {
    /// 단순 숫자 값
    Number(f64),
    /// 문자열 값
    String(String),
    /// 불리언 값
    Boolean(bool),
    /// Null 값
    Null,
    /// 복합 객체 (CompositeData)
    Composite(HashMap<String, AttributeValue>),
    /// 배열
    Array(Vec<AttributeValue>),
    /// 와일드카드 결과 (MBean ObjectName -> 속성 맵)
    Wildcard(HashMap<String, HashMap<String, AttributeValue>>),
}

/// 개별 속성 값
#[derive(Debug, Clone)]
pub enum AttributeValue {
    /// 정수
    Integer(i64),
    /// 실수
    Float(f64),
    /// 문자열
    String(String),
    /// 불리언
    Boolean(bool),
    /// Null
    Null,
    /// 중첩 객체
    Object(HashMap<String, AttributeValue>),
    /// 배열
    Array(Vec<AttributeValue>),
}

impl AttributeValue {
    /// 정수로 변환 시도
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            AttributeValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            AttributeValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// 불리언으로 변환 시도
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// 문자열로 변환
    pub fn as_string(&self) -> Option<String> {
        match self {
            AttributeValue::String(s) => Some(s.clone()),
            AttributeValue::Integer(i) => Some(i.to_string()),
            AttributeValue::Float(f) => Some(f.to_string()),
            AttributeValue::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl MBeanValue {
    /// 단순 정수 값 추출
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MBeanValue::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    /// Composite 값에서 특정 키의 정수 추출
    pub fn get_composite_i64(&self, key: &str) -> Option<i64> {
        match self {
            MBeanValue::Composite(map) => map.get(key).and_then(|v| v.as_i64()),
            _ => None,
        }
    }

    /// 배열 값을 정수 벡터로 추출
    pub fn as_i64_array(&self) -> Option<Vec<i64>> {
        match self {
            MBeanValue::Array(items) => items.iter().map(|v| v.as_i64()).collect(),
            _ => None,
        }
    }
}

/// 단일 응답 파싱
pub fn parse_response(json: &str) -> CollectResult<JolokiaResponse> {
    let raw: RawJolokiaResponse =
        serde_json::from_str(json).map_err(|e| CollectorError::JsonParse(e.to_string()))?;

    // 에러 응답 처리
    if raw.status != 200 {
        return Ok(JolokiaResponse {
            value: MBeanValue::Null,
            status: raw.status,
            error: raw.error,
            error_type: raw.error_type,
        });
    }

    let value = match raw.value {
        Some(v) => parse_mbean_value(v)?,
        None => MBeanValue::Null,
    };

    Ok(JolokiaResponse {
        value,
        status: raw.status,
        error: raw.error,
        error_type: raw.error_type,
    })
}

/// 내부 파싱용 구조체
#[derive(Deserialize)]
struct RawJolokiaResponse {
    value: Option<Value>,
    status: u16,
    error: Option<String>,
    error_type: Option<String>,
}

fn parse_mbean_value(value: Value) -> CollectResult<MBeanValue> {
    match value {
        Value::Null => Ok(MBeanValue::Null),
        Value::Bool(b) => Ok(MBeanValue::Boolean(b)),
        Value::Number(n) => {
            let f = n.as_f64().ok_or_else(|| {
                CollectorError::JsonParse(format!("Number {} cannot be represented as f64", n))
            })?;
            Ok(MBeanValue::Number(f))
        }
        Value::String(s) => Ok(MBeanValue::String(s)),
        Value::Array(arr) => {
            let parsed: Vec<AttributeValue> = arr
                .into_iter()
                .map(parse_attribute_value)
                .collect::<CollectResult<_>>()?;
            Ok(MBeanValue::Array(parsed))
        }
        Value::Object(map) => {
            // 와일드카드 응답인지 확인 (키가 모두 MBean ObjectName 형태)
            let is_wildcard = map
                .iter()
                .all(|(k, v)| k.contains(':') && k.contains('=') && v.is_object());

            if is_wildcard && !map.is_empty() {
                let mut result = HashMap::new();
                for (mbean_name, attrs) in map {
                    if let Value::Object(attr_map) = attrs {
                        let parsed_attrs: HashMap<String, AttributeValue> = attr_map
                            .into_iter()
                            .map(|(k, v)| Ok((k, parse_attribute_value(v)?)))
                            .collect::<CollectResult<_>>()?;
                        result.insert(mbean_name, parsed_attrs);
                    }
                }
                Ok(MBeanValue::Wildcard(result))
            } else {
                // 일반 CompositeData
                let parsed: HashMap<String, AttributeValue> = map
                    .into_iter()
                    .map(|(k, v)| Ok((k, parse_attribute_value(v)?)))
                    .collect::<CollectResult<_>>()?;
                Ok(MBeanValue::Composite(parsed))
            }
        }
    }
}

fn parse_attribute_value(value: Value) -> CollectResult<AttributeValue> {
    match value {
        Value::Null => Ok(AttributeValue::Null),
        Value::Bool(b) => Ok(AttributeValue::Boolean(b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(AttributeValue::Integer(i))
            } else {
                Ok(AttributeValue::Float(n.as_f64().ok_or_else(|| {
                    CollectorError::JsonParse(format!("Number {} cannot be represented as f64", n))
                })?))
            }
        }
        Value::String(s) => Ok(AttributeValue::String(s)),
        Value::Array(arr) => {
            let parsed: Vec<AttributeValue> = arr
                .into_iter()
                .map(parse_attribute_value)
                .collect::<CollectResult<_>>()?;
            Ok(AttributeValue::Array(parsed))
        }
        Value::Object(map) => {
            let parsed: HashMap<String, AttributeValue> = map
                .into_iter()
                .map(|(k, v)| Ok((k, parse_attribute_value(v)?)))
                .collect::<CollectResult<_>>()?;
            Ok(AttributeValue::Object(parsed))
        }
    }
}

/// MBean ObjectName 구조
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectName {
    /// 도메인 (예: "java.lang")
    pub domain: String,
    /// 속성 (예: {"type": "MemoryPool", "name": "Eden"})
    pub properties: HashMap<String, String>,
}

impl ObjectName {
    /// ObjectName 문자열 파싱
    ///
    /// # Limitations
    /// - Quoted keys/values are NOT fully supported
    pub fn parse(s: &str) -> CollectResult<Self> {
        let parts: Vec<&str> = s.splitn(2, ':').collect();
        if parts.len() != 2 {
            return Err(CollectorError::InvalidObjectName(s.to_string()));
        }

        let domain = parts[0].to_string();
        let mut properties = HashMap::new();

        for prop in parts[1].split(',') {
            let kv: Vec<&str> = prop.splitn(2, '=').collect();
            if kv.len() == 2 {
                properties.insert(kv[0].to_string(), kv[1].to_string());
            }
        }

        Ok(Self { domain, properties })
    }

    /// `name` 속성 추출 - 동적으로 발견된 인스턴스의 식별자
    pub fn instance_name(&self) -> Option<&str> {
        self.properties.get("name").map(|s| s.as_str())
    }
}
