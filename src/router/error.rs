//! Router Error Types
//!
//! 라우터 에러 정의

use thiserror::Error;

use super::types::ShardCoordinate;

// ============================================================================
// RouterError - 라우터 에러
// ============================================================================

/// 라우터 에러
///
/// 라우팅 실패는 모두 로컬 해석 실패이므로 라우터 자체에서 재시도하지 않습니다.
/// 같은 키는 항상 같은 샤드로 배치되기 때문에 배치만 다시 시도해서는
/// 설정이나 데이터 문제를 고칠 수 없습니다.
#[derive(Error, Debug)]
pub enum RouterError {
    /// 설정 에러 (샤드 수 미등록, 잘못된 샤드 수, 알 수 없는 알고리즘)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 라우팅 키 추출 에러 (인자/필드 없음, 호환되지 않는 타입)
    #[error("Routing key extraction error: {0}")]
    RoutingKeyExtraction(String),

    /// 라우팅 키 누락 (null 또는 빈 키)
    #[error("Missing routing key: {0}")]
    MissingRoutingKey(String),

    /// 재진입 정책 위반
    #[error("Routing context conflict: outer {outer} is active, inner call placed at {inner}")]
    ContextConflict {
        /// 활성 좌표
        outer: ShardCoordinate,
        /// 안쪽 호출의 배치 좌표
        inner: ShardCoordinate,
    },

    /// 래핑된 작업의 실행 에러
    #[error("Execution error: {0}")]
    Execution(String),
}

impl RouterError {
    /// 설정 에러 생성
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// 라우팅 키 추출 에러 생성
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::RoutingKeyExtraction(msg.into())
    }

    /// 라우팅 키 누락 에러 생성
    pub fn missing_key(msg: impl Into<String>) -> Self {
        Self::MissingRoutingKey(msg.into())
    }

    /// 컨텍스트 충돌 에러 생성
    pub fn context_conflict(outer: ShardCoordinate, inner: ShardCoordinate) -> Self {
        Self::ContextConflict { outer, inner }
    }

    /// 실행 에러 생성
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// 재시도 가능 여부
    ///
    /// 라우팅 에러는 결정적이므로 항상 `false`입니다.
    /// 실행 에러의 재시도 여부는 실행 계층이 판단합니다.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// 라우팅 단계에서 발생한 에러 여부
    pub fn is_routing_error(&self) -> bool {
        !matches!(self, Self::Execution(_))
    }

    /// 프로그래머 에러 여부 (태깅 또는 설정 오류)
    pub fn is_programmer_error(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::RoutingKeyExtraction(_))
    }
}

// ============================================================================
// Result Type
// ============================================================================

/// 라우터 결과 타입
pub type RouterResult<T> = Result<T, RouterError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_error_creation() {
        let err = RouterError::configuration("no shard config for 'orders'");
        assert!(matches!(err, RouterError::Configuration(_)));

        let err = RouterError::extraction("argument 3 is absent");
        assert!(matches!(err, RouterError::RoutingKeyExtraction(_)));

        let err = RouterError::missing_key("userId is null");
        assert!(matches!(err, RouterError::MissingRoutingKey(_)));
    }

    #[test]
    fn test_router_error_display() {
        let err = RouterError::configuration("no shard config for 'orders'");
        assert_eq!(
            err.to_string(),
            "Configuration error: no shard config for 'orders'"
        );

        let err = RouterError::context_conflict(
            ShardCoordinate::new(1, Some(2)),
            ShardCoordinate::new(3, None),
        );
        assert_eq!(
            err.to_string(),
            "Routing context conflict: outer (1, 2) is active, inner call placed at (3, -)"
        );
    }

    #[test]
    fn test_router_error_never_retryable() {
        assert!(!RouterError::configuration("x").is_retryable());
        assert!(!RouterError::missing_key("x").is_retryable());
        assert!(!RouterError::execution("x").is_retryable());
    }

    #[test]
    fn test_router_error_classification() {
        assert!(RouterError::configuration("x").is_programmer_error());
        assert!(RouterError::extraction("x").is_programmer_error());
        assert!(!RouterError::missing_key("x").is_programmer_error());

        assert!(RouterError::missing_key("x").is_routing_error());
        assert!(!RouterError::execution("x").is_routing_error());
    }
}
