//! Router Module
//!
//! 샤드 라우팅 코어
//!
//! # 구성
//!
//! - 태그 등록 및 규칙 해석 (RouteTag, RouteRegistry, RouteSpec)
//! - 샤드 배치 (ShardingAlgorithm, ModHash, SpreadHash, RangeBased)
//! - 라우팅 컨텍스트 (RoutingContext, ContextPolicy)
//! - 인터셉터 (ShardRouter, Invocation)
//! - 데이터 소스 디스패치 (DataSourceDispatcher, DataSourceTable)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use shard_router::router::{
//!     DataSourceDispatcher, DataSourceTable, Invocation, RouteRegistry, RouteTag,
//!     RouterConfig, ShardConfig, ShardRouter, Value,
//! };
//!
//! let config = RouterConfig::builder()
//!     .with_resource("orders", ShardConfig::new(4, 8)?.with_router_key("userId"))
//!     .build()?;
//! let dispatcher = DataSourceTable::from_config(&config);
//!
//! // 타입 전체에 태그, insert 메서드만 테이블 분할
//! let registry = Arc::new(RouteRegistry::new());
//! registry.register_type("OrderRepository", RouteTag::new().resource("orders"));
//! registry.register_method("OrderRepository", "insert", RouteTag::new().split_table(true));
//!
//! let router = ShardRouter::with_config(registry, config)?;
//!
//! let order = Value::from(std::collections::HashMap::from([
//!     ("userId".to_string(), Value::from("user-42")),
//! ]));
//! let invocation = Invocation::new("OrderRepository", "insert").arg(order);
//!
//! let target = router.route(&invocation, || {
//!     // 실행 계층은 쿼리 직전에 현재 컨텍스트를 읽음
//!     dispatcher.dispatch("orders")
//! })?;
//! assert_eq!(target.to_string(), "ds_3.orders_3");
//! ```

mod config;
mod dispatch;
mod error;
mod interceptor;
mod registry;
pub mod routing;
mod spec;
mod types;

pub use config::{
    ConfigProvider, RouterConfig, RouterConfigBuilder, ShardConfig, SharedConfig, DEFAULT_ALGORITHM,
};
pub use dispatch::{DataSourceDispatcher, DataSourceTable, ShardTarget};
pub use error::{RouterError, RouterResult};
pub use interceptor::{
    ArgumentAccessor, Invocation, Placement, RoutePhase, RouterMetrics, ShardRouter, ValueAccessor,
};
pub use registry::{DeclarationId, RouteRegistry};
pub use routing::{Admission, ContextPolicy, RoutingContext, ShardingAlgorithm};
pub use spec::{KeyAccessor, RouteSpec, RouteTag, TargetKind};
pub use types::{RoutingKey, ShardCoordinate, Value};
