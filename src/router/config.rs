//! Router Configuration
//!
//! 리소스별 샤드 설정 및 라우터 설정

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::error::{RouterError, RouterResult};
use super::routing::ContextPolicy;

/// 기본 배치 알고리즘 이름
pub const DEFAULT_ALGORITHM: &str = "mod_hash";

// ============================================================================
// ShardConfig - 리소스별 샤드 설정
// ============================================================================

/// 리소스별 샤드 설정
///
/// 논리 리소스 이름(예: `orders`)에 대해 데이터베이스 수와 테이블 수를 정의합니다.
/// `table_count`는 테이블 분할이 활성화된 경우에만 사용됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardConfig {
    /// 데이터베이스 수
    pub db_count: u32,
    /// 데이터베이스당 테이블 수
    #[serde(default = "default_table_count")]
    pub table_count: u32,
    /// 기본 라우팅 키 필드 (태그에 키가 없을 때 사용)
    #[serde(default)]
    pub router_key: Option<String>,
}

fn default_table_count() -> u32 {
    1
}

impl ShardConfig {
    /// 새 샤드 설정 생성
    pub fn new(db_count: u32, table_count: u32) -> RouterResult<Self> {
        let config = Self {
            db_count,
            table_count,
            router_key: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// 기본 라우팅 키 설정
    pub fn with_router_key(mut self, key: impl Into<String>) -> Self {
        self.router_key = Some(key.into());
        self
    }

    /// 설정 검증
    pub fn validate(&self) -> RouterResult<()> {
        if self.db_count == 0 {
            return Err(RouterError::configuration("db_count must be at least 1"));
        }
        if self.table_count == 0 {
            return Err(RouterError::configuration("table_count must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// ConfigProvider - 설정 제공자
// ============================================================================

/// 샤드 설정 제공자
///
/// 리소스 이름으로 샤드 설정을 조회합니다. 등록되지 않은 리소스는
/// `RouterError::Configuration`으로 실패해야 합니다.
pub trait ConfigProvider: Send + Sync {
    /// 리소스의 샤드 설정 조회
    fn shard_config(&self, resource: &str) -> RouterResult<ShardConfig>;
}

fn unregistered(resource: &str) -> RouterError {
    RouterError::configuration(format!(
        "no shard config registered for resource '{}'",
        resource
    ))
}

/// 런타임 등록을 허용하는 공유 설정 제공자
#[derive(Debug, Default)]
pub struct SharedConfig {
    resources: RwLock<HashMap<String, ShardConfig>>,
}

impl SharedConfig {
    /// 빈 제공자 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 리소스 설정 등록 (기존 설정 교체)
    pub fn register(&self, resource: impl Into<String>, config: ShardConfig) -> RouterResult<()> {
        config.validate()?;
        self.resources.write().insert(resource.into(), config);
        Ok(())
    }

    /// 리소스 설정 제거
    pub fn remove(&self, resource: &str) -> Option<ShardConfig> {
        self.resources.write().remove(resource)
    }

    /// 등록된 리소스 수
    pub fn len(&self) -> usize {
        self.resources.read().len()
    }

    /// 비어 있는지 확인
    pub fn is_empty(&self) -> bool {
        self.resources.read().is_empty()
    }
}

impl ConfigProvider for SharedConfig {
    fn shard_config(&self, resource: &str) -> RouterResult<ShardConfig> {
        self.resources
            .read()
            .get(resource)
            .cloned()
            .ok_or_else(|| unregistered(resource))
    }
}

// ============================================================================
// RouterConfig - 라우터 설정
// ============================================================================

/// 라우터 설정
///
/// # 필드
///
/// | 필드 | 기본값 | 설명 |
/// |------|--------|------|
/// | `default_data_source` | `"default"` | 컨텍스트가 없을 때 사용할 데이터 소스 |
/// | `data_source_prefix` | `"ds"` | 데이터 소스 이름 접두사 (`ds_2`) |
/// | `data_sources` | 비어 있음 | 인덱스별 데이터 소스 이름 (지정 시 접두사 대신 사용) |
/// | `db_suffix_width` | 0 | 데이터 소스 인덱스 0 패딩 폭 |
/// | `table_suffix_width` | 0 | 테이블 인덱스 0 패딩 폭 |
/// | `context_policy` | `reuse_outer` | 중첩 라우팅 호출 정책 |
/// | `algorithm` | `"mod_hash"` | 전역 기본 배치 알고리즘 |
///
/// # 예시
///
/// ```toml
/// default_data_source = "ds_main"
/// context_policy = "stack"
///
/// [resources.orders]
/// db_count = 4
/// table_count = 8
/// router_key = "userId"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// 기본 (비샤딩) 데이터 소스
    pub default_data_source: String,
    /// 데이터 소스 이름 접두사
    pub data_source_prefix: String,
    /// 인덱스별 데이터 소스 이름
    pub data_sources: Vec<String>,
    /// 데이터 소스 인덱스 패딩 폭
    pub db_suffix_width: usize,
    /// 테이블 인덱스 패딩 폭
    pub table_suffix_width: usize,
    /// 기본 재진입 정책
    pub context_policy: ContextPolicy,
    /// 전역 기본 배치 알고리즘 이름
    pub algorithm: String,
    /// 리소스별 샤드 설정
    pub resources: HashMap<String, ShardConfig>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_data_source: "default".to_string(),
            data_source_prefix: "ds".to_string(),
            data_sources: Vec::new(),
            db_suffix_width: 0,
            table_suffix_width: 0,
            context_policy: ContextPolicy::default(),
            algorithm: DEFAULT_ALGORITHM.to_string(),
            resources: HashMap::new(),
        }
    }
}

impl RouterConfig {
    /// 빌더 시작
    pub fn builder() -> RouterConfigBuilder {
        RouterConfigBuilder::default()
    }

    /// TOML 문자열에서 설정 로드
    pub fn from_toml_str(input: &str) -> RouterResult<Self> {
        let config: RouterConfig = toml::from_str(input)
            .map_err(|e| RouterError::configuration(format!("invalid router config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 설정 검증
    pub fn validate(&self) -> RouterResult<()> {
        for (resource, shard) in &self.resources {
            shard.validate().map_err(|e| {
                RouterError::configuration(format!("resource '{}': {}", resource, e))
            })?;
            if !self.data_sources.is_empty() && (shard.db_count as usize) > self.data_sources.len()
            {
                return Err(RouterError::configuration(format!(
                    "resource '{}' needs {} data sources, only {} configured",
                    resource,
                    shard.db_count,
                    self.data_sources.len()
                )));
            }
        }
        Ok(())
    }
}

impl ConfigProvider for RouterConfig {
    fn shard_config(&self, resource: &str) -> RouterResult<ShardConfig> {
        self.resources
            .get(resource)
            .cloned()
            .ok_or_else(|| unregistered(resource))
    }
}

/// 라우터 설정 빌더
#[derive(Debug, Clone, Default)]
pub struct RouterConfigBuilder {
    config: RouterConfig,
}

impl RouterConfigBuilder {
    /// 기본 데이터 소스 설정
    pub fn with_default_data_source(mut self, name: impl Into<String>) -> Self {
        self.config.default_data_source = name.into();
        self
    }

    /// 데이터 소스 접두사 설정
    pub fn with_data_source_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.data_source_prefix = prefix.into();
        self
    }

    /// 인덱스별 데이터 소스 이름 설정
    pub fn with_data_sources<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.data_sources = names.into_iter().map(Into::into).collect();
        self
    }

    /// 데이터 소스 인덱스 패딩 폭 설정
    pub fn with_db_suffix_width(mut self, width: usize) -> Self {
        self.config.db_suffix_width = width;
        self
    }

    /// 테이블 인덱스 패딩 폭 설정
    pub fn with_table_suffix_width(mut self, width: usize) -> Self {
        self.config.table_suffix_width = width;
        self
    }

    /// 재진입 정책 설정
    pub fn with_context_policy(mut self, policy: ContextPolicy) -> Self {
        self.config.context_policy = policy;
        self
    }

    /// 전역 배치 알고리즘 설정
    pub fn with_algorithm(mut self, name: impl Into<String>) -> Self {
        self.config.algorithm = name.into();
        self
    }

    /// 리소스 샤드 설정 추가
    pub fn with_resource(mut self, resource: impl Into<String>, shard: ShardConfig) -> Self {
        self.config.resources.insert(resource.into(), shard);
        self
    }

    /// 설정 빌드
    pub fn build(self) -> RouterResult<RouterConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ============================================================================
// Tests
// ============================================================================
