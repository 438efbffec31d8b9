//! 샤드 배치 및 라우팅 컨텍스트
//!
//! 라우팅 키를 샤드 좌표로 배치하는 알고리즘과, 배치된 좌표를 호출 범위
//! 동안 보관하는 컨텍스트를 제공합니다.
//!
//! # 예시
//!
//! ```ignore
//! use shard_router::router::routing::{ContextPolicy, ModHash, RoutingContext, ShardingAlgorithm};
//! use shard_router::router::{RoutingKey, ShardConfig};
//!
//! let shard = ShardConfig::new(4, 8)?;
//! let coordinate = ModHash.place(&RoutingKey::from("user-42"), &shard, true)?;
//!
//! // 동기 호출
//! RoutingContext::set(coordinate, ContextPolicy::ReuseOuter, || {
//!     assert_eq!(RoutingContext::get(), Some(coordinate));
//! })?;
//! assert_eq!(RoutingContext::get(), None);
//!
//! // 비동기 호출
//! RoutingContext::scope(coordinate, async {
//!     assert_eq!(RoutingContext::get(), Some(coordinate));
//! })
//! .await;
//! ```

mod algorithm;
mod context;

pub use algorithm::{AlgorithmSet, ModHash, RangeBased, ShardingAlgorithm, SpreadHash};
pub use context::{Admission, ContextPolicy, RoutingContext};
