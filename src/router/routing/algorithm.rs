//! 배치 알고리즘
//!
//! 라우팅 키를 샤드 좌표로 변환하는 전략을 정의합니다.
//! 모든 전략은 순수 함수이며 같은 입력에 항상 같은 좌표를 반환합니다.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::super::config::{ShardConfig, DEFAULT_ALGORITHM};
use super::super::error::{RouterError, RouterResult};
use super::super::types::{RoutingKey, ShardCoordinate};

/// 배치 알고리즘
///
/// `place`는 부수 효과가 없어야 하며, 같은 키와 설정에 대해 프로세스
/// 재시작 이후에도 같은 좌표를 반환해야 합니다.
pub trait ShardingAlgorithm: Send + Sync {
    /// 키를 샤드 좌표로 배치
    ///
    /// `split_table`이 false이면 테이블 인덱스는 `None`이어야 합니다.
    fn place(
        &self,
        key: &RoutingKey,
        shard: &ShardConfig,
        split_table: bool,
    ) -> RouterResult<ShardCoordinate>;

    /// 알고리즘 이름
    fn name(&self) -> &str;
}

// ============================================================================
// ModHash - 기본 알고리즘
// ============================================================================

/// 해시 나머지 배치 (기본값)
///
/// `db = hash mod db_count`, `table = hash mod table_count`를 각각 독립적으로
/// 계산하므로 데이터베이스와 테이블 배치가 각각 균등하게 분포합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModHash;

impl ShardingAlgorithm for ModHash {
    fn place(
        &self,
        key: &RoutingKey,
        shard: &ShardConfig,
        split_table: bool,
    ) -> RouterResult<ShardCoordinate> {
        shard.validate()?;
        let hash = key.hash_code();
        let db_index = (hash % shard.db_count as u64) as u32;
        let table_index = split_table.then(|| (hash % shard.table_count as u64) as u32);
        Ok(ShardCoordinate::new(db_index, table_index))
    }

    fn name(&self) -> &str {
        "mod_hash"
    }
}

// ============================================================================
// SpreadHash - 슬롯 확산 배치
// ============================================================================

/// 슬롯 확산 배치
///
/// 전체 슬롯(`db_count * table_count`)에 대해 상위 비트를 섞은 해시를
/// 마스킹하여 슬롯을 고른 뒤, 슬롯을 데이터베이스/테이블로 나눕니다.
/// 슬롯 수는 2의 거듭제곱이어야 합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadHash;

impl SpreadHash {
    fn spread(key: &RoutingKey) -> u32 {
        let hash = key.hash_code();
        let folded = (hash ^ (hash >> 32)) as u32;
        folded ^ (folded >> 16)
    }
}

impl ShardingAlgorithm for SpreadHash {
    fn place(
        &self,
        key: &RoutingKey,
        shard: &ShardConfig,
        split_table: bool,
    ) -> RouterResult<ShardCoordinate> {
        shard.validate()?;
        let table_count = if split_table { shard.table_count } else { 1 };
        let slots = shard
            .db_count
            .checked_mul(table_count)
            .filter(|s| s.is_power_of_two())
            .ok_or_else(|| {
                RouterError::configuration(format!(
                    "spread_hash needs a power-of-two slot count, got {} x {}",
                    shard.db_count, table_count
                ))
            })?;

        let slot = (slots - 1) & Self::spread(key);
        let db_index = slot / table_count;
        let table_index = split_table.then_some(slot % table_count);
        Ok(ShardCoordinate::new(db_index, table_index))
    }

    fn name(&self) -> &str {
        "spread_hash"
    }
}

// ============================================================================
// RangeBased - 정수 범위 배치
// ============================================================================

/// 정수 범위 배치
///
/// 경계값으로 데이터베이스를 선택합니다. N개 데이터베이스에는 N-1개의
/// 경계가 필요합니다.
/// - DB 0: `[MIN, boundaries[0])`
/// - DB i: `[boundaries[i-1], boundaries[i])`
/// - DB N-1: `[boundaries[N-2], MAX]`
///
/// 테이블 인덱스는 `hash mod table_count`로 계산합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeBased {
    boundaries: Vec<i64>,
}

impl RangeBased {
    /// 명시적 경계로 생성 (정렬됨)
    pub fn new(mut boundaries: Vec<i64>) -> Self {
        boundaries.sort_unstable();
        boundaries.dedup();
        Self { boundaries }
    }

    /// 균등 간격 경계로 생성
    pub fn for_int_range(min: i64, max: i64, db_count: u32) -> Self {
        if db_count <= 1 || max <= min {
            return Self::new(Vec::new());
        }
        let step = (max - min) / db_count as i64;
        Self::new((1..db_count).map(|i| min + step * i as i64).collect())
    }

    /// 경계 목록
    pub fn boundaries(&self) -> &[i64] {
        &self.boundaries
    }
}

impl ShardingAlgorithm for RangeBased {
    fn place(
        &self,
        key: &RoutingKey,
        shard: &ShardConfig,
        split_table: bool,
    ) -> RouterResult<ShardCoordinate> {
        shard.validate()?;
        if shard.db_count as usize != self.boundaries.len() + 1 {
            return Err(RouterError::configuration(format!(
                "range placement has {} boundaries for {} databases",
                self.boundaries.len(),
                shard.db_count
            )));
        }
        let value = key.as_int().ok_or_else(|| {
            RouterError::extraction(format!("range placement needs an integer key, got '{}'", key))
        })?;

        let db_index = self.boundaries.partition_point(|b| *b <= value) as u32;
        let table_index =
            split_table.then(|| (key.hash_code() % shard.table_count as u64) as u32);
        Ok(ShardCoordinate::new(db_index, table_index))
    }

    fn name(&self) -> &str {
        "range"
    }
}

// ============================================================================
// AlgorithmSet - 이름별 알고리즘
// ============================================================================

/// 이름으로 등록된 배치 알고리즘 집합
///
/// 태그에 알고리즘 이름이 없으면 전역 기본 알고리즘을 사용합니다.
#[derive(Clone)]
pub struct AlgorithmSet {
    default_name: String,
    algorithms: HashMap<String, Arc<dyn ShardingAlgorithm>>,
}

impl AlgorithmSet {
    /// 내장 알고리즘(`mod_hash`, `spread_hash`)으로 생성
    pub fn new() -> Self {
        let mut set = Self {
            default_name: DEFAULT_ALGORITHM.to_string(),
            algorithms: HashMap::new(),
        };
        set.register(Arc::new(ModHash));
        set.register(Arc::new(SpreadHash));
        set
    }

    /// 알고리즘 등록 (같은 이름은 교체)
    pub fn register(&mut self, algorithm: Arc<dyn ShardingAlgorithm>) {
        self.algorithms
            .insert(algorithm.name().to_string(), algorithm);
    }

    /// 전역 기본 알고리즘 지정
    pub fn set_default(&mut self, name: impl Into<String>) -> RouterResult<()> {
        let name = name.into();
        if !self.algorithms.contains_key(&name) {
            return Err(unknown_algorithm(&name));
        }
        self.default_name = name;
        Ok(())
    }

    /// 기본 알고리즘 이름
    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// 알고리즘 조회 (`None`이면 기본값)
    pub fn get(&self, name: Option<&str>) -> RouterResult<Arc<dyn ShardingAlgorithm>> {
        let name = name.unwrap_or(&self.default_name);
        self.algorithms
            .get(name)
            .cloned()
            .ok_or_else(|| unknown_algorithm(name))
    }

    /// 등록된 알고리즘 이름 목록
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.algorithms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn unknown_algorithm(name: &str) -> RouterError {
    RouterError::configuration(format!("unknown sharding algorithm '{}'", name))
}

impl Default for AlgorithmSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AlgorithmSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmSet")
            .field("default", &self.default_name)
            .field("algorithms", &self.names())
            .finish()
    }
}
