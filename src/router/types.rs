//! Router Types
//!
//! 라우터에서 사용하는 타입 정의

use std::collections::HashMap;
use std::fmt;

use super::error::{RouterError, RouterResult};

// ============================================================================
// Value - 호출 인자 값
// ============================================================================

/// 호출 인자 값 타입
///
/// 라우팅 대상 작업의 인자를 표현합니다. 레코드형 인자는 `Map`으로 표현하며
/// 필드 이름으로 라우팅 키를 꺼낼 수 있습니다.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null
    Null,
    /// Boolean
    Boolean(bool),
    /// Integer (i64)
    Integer(i64),
    /// Float (f64)
    Float(f64),
    /// String
    String(String),
    /// Bytes
    Bytes(Vec<u8>),
    /// List
    List(Vec<Value>),
    /// Map (레코드)
    Map(HashMap<String, Value>),
}

impl Value {
    /// Null 여부
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer로 변환
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// String으로 변환
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Map으로 변환
    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// 레코드 필드 조회
    ///
    /// `a.b` 형식의 경로를 따라 중첩된 Map을 탐색합니다.
    pub fn field(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(self, |current, name| current.as_map()?.get(name))
    }

    /// 타입 이름
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::List(l) => write!(f, "[{} items]", l.len()),
            Value::Map(m) => write!(f, "{{{} entries}}", m.len()),
        }
    }
}

// From implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(v: HashMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

// ============================================================================
// RoutingKey - 라우팅 키
// ============================================================================

/// 라우팅 키
///
/// 샤드 배치에 사용되는 값입니다. 정수 키는 정수 값 그대로,
/// 문자열/바이트 키는 CRC-32(IEEE)로 해시되므로 프로세스와 플랫폼에
/// 관계없이 같은 키는 같은 해시를 가집니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoutingKey {
    /// 정수 키
    Int(i64),
    /// 문자열 키
    Str(String),
    /// 바이트 키
    Bytes(Vec<u8>),
}

impl RoutingKey {
    /// 인자 값에서 라우팅 키 생성
    ///
    /// `source`는 에러 메시지에 쓰이는 키 출처 설명입니다.
    pub fn from_value(value: &Value, source: &str) -> RouterResult<Self> {
        match value {
            Value::Null => Err(RouterError::missing_key(format!("{} is null", source))),
            Value::Integer(i) => Ok(RoutingKey::Int(*i)),
            Value::String(s) if s.trim().is_empty() => {
                Err(RouterError::missing_key(format!("{} is blank", source)))
            }
            Value::String(s) => Ok(RoutingKey::Str(s.clone())),
            Value::Bytes(b) if b.is_empty() => {
                Err(RouterError::missing_key(format!("{} is empty", source)))
            }
            Value::Bytes(b) => Ok(RoutingKey::Bytes(b.clone())),
            other => Err(RouterError::extraction(format!(
                "{} has incompatible type {}",
                source,
                other.type_name()
            ))),
        }
    }

    /// 안정 해시 값
    pub fn hash_code(&self) -> u64 {
        match self {
            RoutingKey::Int(i) => *i as u64,
            RoutingKey::Str(s) => crc32fast::hash(s.as_bytes()) as u64,
            RoutingKey::Bytes(b) => crc32fast::hash(b) as u64,
        }
    }

    /// 정수 키로 변환
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RoutingKey::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingKey::Int(i) => write!(f, "{}", i),
            RoutingKey::Str(s) => write!(f, "{}", s),
            RoutingKey::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for RoutingKey {
    fn from(v: i64) -> Self {
        RoutingKey::Int(v)
    }
}

impl From<&str> for RoutingKey {
    fn from(v: &str) -> Self {
        RoutingKey::Str(v.to_string())
    }
}

impl From<String> for RoutingKey {
    fn from(v: String) -> Self {
        RoutingKey::Str(v)
    }
}

// ============================================================================
// ShardCoordinate - 샤드 좌표
// ============================================================================

/// 샤드 좌표 (데이터베이스 인덱스, 테이블 인덱스)
///
/// 테이블 인덱스는 테이블 분할이 활성화된 경우에만 존재합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShardCoordinate {
    /// 데이터베이스 인덱스 `[0, db_count)`
    pub db_index: u32,
    /// 테이블 인덱스 `[0, table_count)`
    pub table_index: Option<u32>,
}

impl ShardCoordinate {
    /// 새 좌표 생성
    pub fn new(db_index: u32, table_index: Option<u32>) -> Self {
        Self {
            db_index,
            table_index,
        }
    }

    /// 데이터베이스 단위 좌표 생성
    pub fn db_only(db_index: u32) -> Self {
        Self::new(db_index, None)
    }
}

impl fmt::Display for ShardCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table_index {
            Some(t) => write!(f, "({}, {})", self.db_index, t),
            None => write!(f, "({}, -)", self.db_index),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_name() {
        assert_eq!(Value::Null.type_name(), "Null");
        assert_eq!(Value::Integer(1).type_name(), "Integer");
        assert_eq!(Value::from("a").type_name(), "String");
        assert_eq!(Value::from(None::<i64>).type_name(), "Null");
    }

    #[test]
    fn test_value_nested_field() {
        let mut inner = HashMap::new();
        inner.insert("id".to_string(), Value::Integer(7));
        let mut outer = HashMap::new();
        outer.insert("user".to_string(), Value::Map(inner));
        let record = Value::Map(outer);

        assert_eq!(record.field("user.id"), Some(&Value::Integer(7)));
        assert_eq!(record.field("user.name"), None);
        assert_eq!(Value::Integer(1).field("id"), None);
    }

    #[test]
    fn test_routing_key_from_value() {
        assert_eq!(
            RoutingKey::from_value(&Value::Integer(42), "arg0").unwrap(),
            RoutingKey::Int(42)
        );
        assert_eq!(
            RoutingKey::from_value(&Value::from("user-42"), "arg0").unwrap(),
            RoutingKey::Str("user-42".into())
        );
    }

    #[test]
    fn test_routing_key_missing() {
        let err = RoutingKey::from_value(&Value::Null, "userId").unwrap_err();
        assert!(matches!(err, RouterError::MissingRoutingKey(_)));

        let err = RoutingKey::from_value(&Value::from("  "), "userId").unwrap_err();
        assert!(matches!(err, RouterError::MissingRoutingKey(_)));

        let err = RoutingKey::from_value(&Value::Bytes(vec![]), "userId").unwrap_err();
        assert!(matches!(err, RouterError::MissingRoutingKey(_)));
    }

    #[test]
    fn test_routing_key_incompatible_type() {
        let err = RoutingKey::from_value(&Value::Float(1.5), "userId").unwrap_err();
        assert!(matches!(err, RouterError::RoutingKeyExtraction(_)));
        assert!(err.to_string().contains("Float"));
    }

    #[test]
    fn test_routing_key_hash_is_stable() {
        // CRC-32 (IEEE) of "user-42"
        assert_eq!(RoutingKey::from("user-42").hash_code(), 2_097_592_435);
        assert_eq!(RoutingKey::Int(42).hash_code(), 42);
        assert_eq!(
            RoutingKey::Bytes(b"user-42".to_vec()).hash_code(),
            RoutingKey::from("user-42").hash_code()
        );
    }

    #[test]
    fn test_shard_coordinate_display() {
        assert_eq!(ShardCoordinate::new(2, Some(5)).to_string(), "(2, 5)");
        assert_eq!(ShardCoordinate::db_only(1).to_string(), "(1, -)");
    }
}
