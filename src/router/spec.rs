//! Route Tags and Specs
//!
//! 라우팅 태그(마커)와 태그에서 해석된 라우팅 규칙

use std::fmt;
use std::str::FromStr;

use super::config::{ConfigProvider, ShardConfig};
use super::error::{RouterError, RouterResult};
use super::routing::ContextPolicy;

// ============================================================================
// TargetKind - 태그 선언 위치
// ============================================================================

/// 태그 선언 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// 타입 전체 (모든 메서드에 적용)
    Type,
    /// 개별 메서드
    Method,
}

// ============================================================================
// KeyAccessor - 라우팅 키 위치
// ============================================================================

/// 라우팅 키를 제공하는 인자 위치
///
/// 문자열 표기:
/// - `#0` → 0번째 인자 자체
/// - `userId` → 레코드 인자 중 `userId` 필드를 가진 첫 번째 인자
/// - `#1.user.id` → 1번째 인자의 `user.id` 필드
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyAccessor {
    /// 위치 인자
    Position(usize),
    /// 필드 이름 (모든 인자에서 검색)
    Field(String),
    /// 특정 위치 인자의 필드
    PositionField {
        /// 인자 위치
        position: usize,
        /// 필드 경로
        field: String,
    },
}

impl KeyAccessor {
    /// 필드 접근자 생성
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }
}

impl fmt::Display for KeyAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(p) => write!(f, "#{}", p),
            Self::Field(name) => write!(f, "{}", name),
            Self::PositionField { position, field } => write!(f, "#{}.{}", position, field),
        }
    }
}

impl FromStr for KeyAccessor {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RouterError::extraction("empty routing key accessor"));
        }
        let Some(rest) = s.strip_prefix('#') else {
            return Ok(Self::Field(s.to_string()));
        };

        let (position, field) = match rest.split_once('.') {
            Some((p, f)) => (p, Some(f)),
            None => (rest, None),
        };
        let position = position
            .parse()
            .map_err(|_| RouterError::extraction(format!("invalid argument position in '{}'", s)))?;
        match field {
            Some(f) if !f.is_empty() => Ok(Self::PositionField {
                position,
                field: f.to_string(),
            }),
            Some(_) => Err(RouterError::extraction(format!("empty field in '{}'", s))),
            None => Ok(Self::Position(position)),
        }
    }
}

// ============================================================================
// RouteTag - 라우팅 마커
// ============================================================================

/// 라우팅 태그
///
/// 타입이나 메서드에 붙이는 선언적 마커입니다. 지정하지 않은 필드는
/// 바깥 태그(메서드 태그의 경우 타입 태그) 또는 설정 기본값을 따릅니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTag {
    /// 테이블 분할 여부 (기본 false)
    pub split_table: Option<bool>,
    /// 라우팅 키 위치
    pub key: Option<KeyAccessor>,
    /// 논리 리소스 이름 (기본값: 선언 타입 이름)
    pub resource: Option<String>,
    /// 배치 알고리즘 이름
    pub algorithm: Option<String>,
    /// 재진입 정책
    pub policy: Option<ContextPolicy>,
}

impl RouteTag {
    /// 빈 태그 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 테이블 분할 여부 설정
    pub fn split_table(mut self, split: bool) -> Self {
        self.split_table = Some(split);
        self
    }

    /// 라우팅 키 위치 설정
    pub fn key(mut self, accessor: KeyAccessor) -> Self {
        self.key = Some(accessor);
        self
    }

    /// 라우팅 키 필드 설정
    pub fn key_field(self, field: impl Into<String>) -> Self {
        self.key(KeyAccessor::Field(field.into()))
    }

    /// 라우팅 키 인자 위치 설정
    pub fn key_position(self, position: usize) -> Self {
        self.key(KeyAccessor::Position(position))
    }

    /// 리소스 이름 설정
    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// 배치 알고리즘 설정
    pub fn algorithm(mut self, name: impl Into<String>) -> Self {
        self.algorithm = Some(name.into());
        self
    }

    /// 재진입 정책 설정
    pub fn policy(mut self, policy: ContextPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// 바깥 태그 위에 덮어쓰기
    ///
    /// 이 태그에 지정된 필드가 우선하고, 비어 있는 필드는 `outer`에서 가져옵니다.
    pub fn merged_over(&self, outer: &RouteTag) -> RouteTag {
        RouteTag {
            split_table: self.split_table.or(outer.split_table),
            key: self.key.clone().or_else(|| outer.key.clone()),
            resource: self.resource.clone().or_else(|| outer.resource.clone()),
            algorithm: self.algorithm.clone().or_else(|| outer.algorithm.clone()),
            policy: self.policy.or(outer.policy),
        }
    }
}

// ============================================================================
// RouteSpec - 해석된 라우팅 규칙
// ============================================================================

/// 해석된 라우팅 규칙
///
/// 선언당 한 번 생성되어 캐시되는 읽기 전용 값입니다. 샤드 수는 규칙에
/// 보관하지 않고 배치할 때마다 설정 제공자에서 조회하므로, 같은 리소스를
/// 쓰는 선언은 항상 같은 설정으로 배치됩니다.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSpec {
    /// 태그 선언 위치
    pub target_kind: TargetKind,
    /// 논리 리소스 이름
    pub resource: String,
    /// 테이블 분할 여부
    pub split_table: bool,
    /// 라우팅 키 위치 (없으면 설정의 `router_key`)
    pub key: Option<KeyAccessor>,
    /// 배치 알고리즘 이름 (없으면 전역 기본값)
    pub algorithm: Option<String>,
    /// 재진입 정책 (없으면 라우터 기본값)
    pub policy: Option<ContextPolicy>,
}

impl RouteSpec {
    /// 태그에서 규칙 생성
    pub fn from_tag(target_kind: TargetKind, default_resource: &str, tag: &RouteTag) -> Self {
        Self {
            target_kind,
            resource: tag
                .resource
                .clone()
                .unwrap_or_else(|| default_resource.to_string()),
            split_table: tag.split_table.unwrap_or(false),
            key: tag.key.clone(),
            algorithm: tag.algorithm.clone(),
            policy: tag.policy,
        }
    }

    /// 리소스의 현재 샤드 설정 조회
    ///
    /// 미등록 리소스는 설정 에러입니다.
    pub fn shard_config(&self, provider: &dyn ConfigProvider) -> RouterResult<ShardConfig> {
        provider.shard_config(&self.resource)
    }

    /// 라우팅 키 위치 결정
    pub fn key_accessor(&self, shard: &ShardConfig) -> RouterResult<KeyAccessor> {
        if let Some(key) = &self.key {
            return Ok(key.clone());
        }
        match &shard.router_key {
            Some(key) => key.parse(),
            None => Err(RouterError::extraction(format!(
                "no routing key declared for resource '{}' and no router_key configured",
                self.resource
            ))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
