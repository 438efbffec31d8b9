//! 데이터 소스 디스패치
//!
//! 실행 계층이 쿼리 직전에 라우팅 컨텍스트를 읽어 물리 데이터 소스와
//! 테이블 이름을 결정하는 경계입니다. 컨텍스트가 없으면 기본(비샤딩)
//! 데이터 소스와 논리 테이블 이름을 그대로 사용합니다.

use std::fmt;

use super::config::RouterConfig;
use super::error::{RouterError, RouterResult};
use super::routing::RoutingContext;
use super::types::ShardCoordinate;

/// 디스패치 대상
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardTarget {
    /// 물리 데이터 소스 이름
    pub data_source: String,
    /// 물리 테이블 이름
    pub table: String,
    /// 사용된 좌표 (컨텍스트가 없으면 None)
    pub coordinate: Option<ShardCoordinate>,
}

impl ShardTarget {
    /// 샤딩된 대상 여부
    pub fn is_sharded(&self) -> bool {
        self.coordinate.is_some()
    }
}

impl fmt::Display for ShardTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.data_source, self.table)
    }
}

/// 데이터 소스 디스패처
pub trait DataSourceDispatcher: Send + Sync {
    /// 좌표에 해당하는 데이터 소스 이름
    ///
    /// 좌표가 구성된 데이터 소스 밖을 가리키면 설정 에러입니다.
    fn data_source_for(&self, coordinate: Option<ShardCoordinate>) -> RouterResult<String>;

    /// 좌표에 해당하는 물리 테이블 이름
    fn table_for(&self, logical_table: &str, coordinate: Option<ShardCoordinate>) -> String;

    /// 현재 라우팅 컨텍스트로 대상 결정
    fn dispatch(&self, logical_table: &str) -> RouterResult<ShardTarget> {
        let coordinate = RoutingContext::get();
        Ok(ShardTarget {
            data_source: self.data_source_for(coordinate)?,
            table: self.table_for(logical_table, coordinate),
            coordinate,
        })
    }
}

// ============================================================================
// DataSourceTable - 기본 디스패처
// ============================================================================

/// 인덱스 기반 데이터 소스 테이블
///
/// 데이터 소스 이름은 명시 목록이 있으면 목록에서, 없으면 `{prefix}_{index}`로
/// 만듭니다. 명시 목록이 있을 때 목록 밖의 인덱스는 에러이며 접두사 이름으로
/// 대체하지 않습니다. 테이블 이름은 테이블 인덱스가 있을 때만 `{table}_{index}`가 됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceTable {
    /// 기본 데이터 소스
    pub default_data_source: String,
    /// 데이터 소스 접두사
    pub prefix: String,
    /// 인덱스별 데이터 소스 이름
    pub data_sources: Vec<String>,
    /// 데이터 소스 인덱스 패딩 폭
    pub db_width: usize,
    /// 테이블 인덱스 패딩 폭
    pub table_width: usize,
}

impl DataSourceTable {
    /// 새 테이블 생성
    pub fn new(default_data_source: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            default_data_source: default_data_source.into(),
            prefix: prefix.into(),
            data_sources: Vec::new(),
            db_width: 0,
            table_width: 0,
        }
    }

    /// 라우터 설정으로 생성
    pub fn from_config(config: &RouterConfig) -> Self {
        Self {
            default_data_source: config.default_data_source.clone(),
            prefix: config.data_source_prefix.clone(),
            data_sources: config.data_sources.clone(),
            db_width: config.db_suffix_width,
            table_width: config.table_suffix_width,
        }
    }

    /// 인덱스별 데이터 소스 이름 지정
    pub fn with_data_sources<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_sources = names.into_iter().map(Into::into).collect();
        self
    }

    /// 패딩 폭 지정
    pub fn with_widths(mut self, db_width: usize, table_width: usize) -> Self {
        self.db_width = db_width;
        self.table_width = table_width;
        self
    }

    /// DB 인덱스의 데이터 소스 이름
    pub fn data_source_name(&self, db_index: u32) -> RouterResult<String> {
        if self.data_sources.is_empty() {
            return Ok(format!("{}_{:0width$}", self.prefix, db_index, width = self.db_width));
        }
        self.data_sources
            .get(db_index as usize)
            .cloned()
            .ok_or_else(|| {
                RouterError::configuration(format!(
                    "db index {} has no data source ({} configured)",
                    db_index,
                    self.data_sources.len()
                ))
            })
    }
}

impl Default for DataSourceTable {
    fn default() -> Self {
        Self::from_config(&RouterConfig::default())
    }
}

impl DataSourceDispatcher for DataSourceTable {
    fn data_source_for(&self, coordinate: Option<ShardCoordinate>) -> RouterResult<String> {
        match coordinate {
            Some(c) => self.data_source_name(c.db_index),
            None => Ok(self.default_data_source.clone()),
        }
    }

    fn table_for(&self, logical_table: &str, coordinate: Option<ShardCoordinate>) -> String {
        match coordinate.and_then(|c| c.table_index) {
            Some(t) => format!("{}_{:0width$}", logical_table, t, width = self.table_width),
            None => logical_table.to_string(),
        }
    }
}
