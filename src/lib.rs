//! # Shard Router
//!
//! Shard routing core for database middleware: routing-key placement,
//! a scoped routing context, and data source dispatch.
//!
//! ## Features
//!
//! - **Declarative Tags** - Mark a type or a single method as sharded, with method tags overriding type tags
//! - **Pluggable Placement** - `ModHash`, `SpreadHash` and `RangeBased` strategies selected by name
//! - **Scoped Context** - Coordinates visible only for the duration of the routed call, on threads and async tasks
//! - **Guaranteed Cleanup** - Context is removed on success, error, panic and cancellation
//! - **Configuration** - Per-resource shard counts from a builder, TOML or a runtime provider
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use shard_router::{
//!     DataSourceDispatcher, DataSourceTable, Invocation, RouteRegistry, RouteTag,
//!     RouterConfig, RouterError, ShardConfig, ShardRouter, Value,
//! };
//!
//! # fn main() -> Result<(), RouterError> {
//! let config = RouterConfig::builder()
//!     .with_resource("orders", ShardConfig::new(4, 8)?.with_router_key("userId"))
//!     .build()?;
//! let dispatcher = DataSourceTable::from_config(&config);
//!
//! let registry = Arc::new(RouteRegistry::new());
//! registry.register_type("OrderRepository", RouteTag::new().resource("orders").split_table(true));
//! let router = ShardRouter::with_config(registry, config)?;
//!
//! let order = Value::from(HashMap::from([("userId".to_string(), Value::from("user-42"))]));
//! let invocation = Invocation::new("OrderRepository", "insert").arg(order);
//!
//! let target = router.route(&invocation, || dispatcher.dispatch("orders"))?;
//! assert_eq!(target.data_source, "ds_3");
//! assert_eq!(target.table, "orders_3");
//!
//! // 라우팅 호출 밖에서는 기본 데이터 소스
//! assert_eq!(dispatcher.dispatch("orders")?.data_source, "default");
//! # Ok(())
//! # }
//! ```
//!
//! ## Async Operations
//!
//! The coordinate travels with the future, so it survives worker-thread migration:
//!
//! ```rust,no_run
//! # use shard_router::{Invocation, RouterError, RoutingContext, ShardRouter};
//! # async fn example(router: &ShardRouter, invocation: &Invocation) -> Result<(), RouterError> {
//! let coordinate = router
//!     .route_async(invocation, || async {
//!         let coordinate = RoutingContext::get();
//!         // ... execute against the selected shard
//!         Ok::<_, RouterError>(coordinate)
//!     })
//!     .await?;
//! assert!(coordinate.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use shard_router::{ConfigProvider, RouterConfig};
//!
//! let config = RouterConfig::from_toml_str(r#"
//!     default_data_source = "main"
//!     context_policy = "stack"
//!
//!     [resources.orders]
//!     db_count = 4
//!     table_count = 8
//!     router_key = "userId"
//! "#).unwrap();
//!
//! assert_eq!(config.shard_config("orders").unwrap().table_count, 8);
//! ```
//!
//! ## Modules
//!
//! - [`router`] - Tags, placement, context, interceptor and dispatch
//! - [`router::routing`] - Placement algorithms and the routing context
//!

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod router;

// Re-exports for convenience
pub use router::{
    ShardRouter, Invocation, Placement, RouterMetrics, RoutePhase,
    ArgumentAccessor, ValueAccessor,
    RouteRegistry, RouteTag, RouteSpec, TargetKind, KeyAccessor, DeclarationId,
    RoutingContext, ContextPolicy, ShardingAlgorithm,
    RouterConfig, RouterConfigBuilder, ShardConfig, SharedConfig, ConfigProvider,
    DataSourceDispatcher, DataSourceTable, ShardTarget,
    RoutingKey, ShardCoordinate, Value,
    RouterError, RouterResult,
};

pub use router::routing::{ModHash, RangeBased, SpreadHash};

/// Config alias for convenience
pub type Config = RouterConfig;
