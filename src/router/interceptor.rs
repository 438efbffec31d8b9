//! 라우팅 인터셉터
//!
//! 태그된 작업 호출을 감싸 라우팅 키 추출, 샤드 배치, 컨텍스트 게시,
//! 작업 위임, 컨텍스트 해제를 순서대로 수행합니다.
//!
//! # 상태 전이
//!
//! ```text
//! Idle → KeyExtracted → Placed → Dispatched → Cleared
//!          │              │                     ▲
//!          └──────────────┴──→ Errored ─────────┘
//! ```
//!
//! 어떤 경로로 끝나든 게시된 컨텍스트는 호출보다 오래 남지 않습니다.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::config::{ConfigProvider, RouterConfig};
use super::error::{RouterError, RouterResult};
use super::registry::{DeclarationId, RouteRegistry};
use super::routing::{
    Admission, AlgorithmSet, ContextPolicy, RoutingContext, ShardingAlgorithm,
};
use super::spec::{KeyAccessor, RouteSpec};
use super::types::{RoutingKey, ShardCoordinate, Value};

// ============================================================================
// Invocation - 작업 호출
// ============================================================================

/// 라우팅 대상 작업 호출
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    declaration: DeclarationId,
    args: Vec<Value>,
}

impl Invocation {
    /// 새 호출 생성
    pub fn new(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            declaration: DeclarationId::new(type_name, method),
            args: Vec::new(),
        }
    }

    /// 인자 추가
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// 인자 목록 설정
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// 선언 식별자
    pub fn declaration(&self) -> &DeclarationId {
        &self.declaration
    }

    /// 인자 목록
    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

// ============================================================================
// ArgumentAccessor - 인자 접근자
// ============================================================================

/// 호출 인자에서 라우팅 키를 꺼내는 접근자
pub trait ArgumentAccessor: Send + Sync {
    /// 라우팅 키 추출
    ///
    /// 인자/필드가 없거나 타입이 맞지 않으면 `RoutingKeyExtraction`,
    /// 값이 null/빈 값이면 `MissingRoutingKey`로 실패합니다.
    fn extract(&self, args: &[Value], accessor: &KeyAccessor) -> RouterResult<RoutingKey>;
}

/// 기본 인자 접근자
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueAccessor;

impl ValueAccessor {
    fn argument<'a>(args: &'a [Value], position: usize) -> RouterResult<&'a Value> {
        args.get(position).ok_or_else(|| {
            RouterError::extraction(format!(
                "argument #{} is absent ({} arguments)",
                position,
                args.len()
            ))
        })
    }
}

impl ArgumentAccessor for ValueAccessor {
    fn extract(&self, args: &[Value], accessor: &KeyAccessor) -> RouterResult<RoutingKey> {
        match accessor {
            KeyAccessor::Position(position) => {
                let value = Self::argument(args, *position)?;
                RoutingKey::from_value(value, &format!("argument #{}", position))
            }
            KeyAccessor::Field(field) => {
                let value = args.iter().find_map(|arg| arg.field(field)).ok_or_else(|| {
                    RouterError::extraction(format!("no argument has field '{}'", field))
                })?;
                RoutingKey::from_value(value, &format!("field '{}'", field))
            }
            KeyAccessor::PositionField { position, field } => {
                let arg = Self::argument(args, *position)?;
                if arg.as_map().is_none() {
                    return Err(RouterError::extraction(format!(
                        "argument #{} is {}, not a record",
                        position,
                        arg.type_name()
                    )));
                }
                let value = arg.field(field).ok_or_else(|| {
                    RouterError::extraction(format!(
                        "argument #{} has no field '{}'",
                        position, field
                    ))
                })?;
                RoutingKey::from_value(value, &format!("argument #{} field '{}'", position, field))
            }
        }
    }
}

// ============================================================================
// RoutePhase - 인터셉터 상태
// ============================================================================

/// 인터셉터 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePhase {
    /// 시작
    Idle,
    /// 라우팅 키 추출 완료
    KeyExtracted,
    /// 샤드 배치 완료
    Placed,
    /// 컨텍스트 게시 후 작업 실행
    Dispatched,
    /// 추출/배치 실패
    Errored,
    /// 컨텍스트 해제 (종료)
    Cleared,
}

impl RoutePhase {
    /// 허용된 전이인지 확인
    pub fn can_transition_to(self, next: RoutePhase) -> bool {
        use RoutePhase::*;
        matches!(
            (self, next),
            (Idle, KeyExtracted)
                | (Idle, Errored)
                | (KeyExtracted, Placed)
                | (KeyExtracted, Errored)
                | (Placed, Dispatched)
                | (Placed, Errored)
                | (Dispatched, Cleared)
                | (Errored, Cleared)
        )
    }

    /// 종료 상태 여부
    pub fn is_terminal(self) -> bool {
        self == RoutePhase::Cleared
    }
}

impl fmt::Display for RoutePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoutePhase::Idle => "idle",
            RoutePhase::KeyExtracted => "key_extracted",
            RoutePhase::Placed => "placed",
            RoutePhase::Dispatched => "dispatched",
            RoutePhase::Errored => "errored",
            RoutePhase::Cleared => "cleared",
        };
        f.write_str(name)
    }
}

/// 호출 하나의 상태 추적
struct PhaseTracker<'a> {
    declaration: &'a DeclarationId,
    phase: RoutePhase,
}

impl<'a> PhaseTracker<'a> {
    fn new(declaration: &'a DeclarationId) -> Self {
        Self {
            declaration,
            phase: RoutePhase::Idle,
        }
    }

    fn advance(&mut self, next: RoutePhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid route phase transition {} -> {}",
            self.phase,
            next
        );
        tracing::trace!(
            declaration = %self.declaration,
            from = %self.phase,
            to = %next,
            "route phase"
        );
        self.phase = next;
    }

    /// 실패 기록 후 종료 상태로 전이
    fn fail(&mut self, err: &RouterError) {
        self.advance(RoutePhase::Errored);
        tracing::warn!(declaration = %self.declaration, error = %err, "Routing failed");
        self.advance(RoutePhase::Cleared);
    }
}

// ============================================================================
// Placement - 배치 결과
// ============================================================================

/// 배치 결과
#[derive(Debug, Clone)]
pub struct Placement {
    /// 적용된 규칙
    pub spec: Arc<RouteSpec>,
    /// 추출된 라우팅 키
    pub key: RoutingKey,
    /// 배치 좌표
    pub coordinate: ShardCoordinate,
    /// 사용된 알고리즘 이름
    pub algorithm: String,
}

// ============================================================================
// ShardRouter - 라우팅 인터셉터
// ============================================================================

/// 라우팅 인터셉터
///
/// 레지스트리에 태그된 선언의 호출을 감쌉니다. 태그가 없는 선언은
/// 컨텍스트 없이 그대로 실행됩니다.
pub struct ShardRouter {
    /// 태그 레지스트리
    registry: Arc<RouteRegistry>,
    /// 샤드 설정 제공자
    provider: Arc<dyn ConfigProvider>,
    /// 배치 알고리즘
    algorithms: AlgorithmSet,
    /// 인자 접근자
    accessor: Arc<dyn ArgumentAccessor>,
    /// 기본 재진입 정책
    default_policy: ContextPolicy,
    /// 카운터
    counters: Counters,
}

#[derive(Debug, Default)]
struct Counters {
    routed: AtomicU64,
    reused: AtomicU64,
    passthrough: AtomicU64,
    failed: AtomicU64,
}

impl ShardRouter {
    /// 새 라우터 생성
    pub fn new(registry: Arc<RouteRegistry>, provider: Arc<dyn ConfigProvider>) -> Self {
        Self {
            registry,
            provider,
            algorithms: AlgorithmSet::new(),
            accessor: Arc::new(ValueAccessor),
            default_policy: ContextPolicy::default(),
            counters: Counters::default(),
        }
    }

    /// 라우터 설정으로 생성
    ///
    /// 설정의 재진입 정책과 기본 알고리즘을 적용합니다.
    pub fn with_config(registry: Arc<RouteRegistry>, config: RouterConfig) -> RouterResult<Self> {
        config.validate()?;
        let policy = config.context_policy;
        let algorithm = config.algorithm.clone();
        Self::new(registry, Arc::new(config))
            .with_context_policy(policy)
            .with_default_algorithm(algorithm)
    }

    /// 배치 알고리즘 등록
    pub fn with_algorithm(mut self, algorithm: Arc<dyn ShardingAlgorithm>) -> Self {
        self.algorithms.register(algorithm);
        self
    }

    /// 전역 기본 알고리즘 지정
    pub fn with_default_algorithm(mut self, name: impl Into<String>) -> RouterResult<Self> {
        self.algorithms.set_default(name)?;
        Ok(self)
    }

    /// 인자 접근자 교체
    pub fn with_accessor(mut self, accessor: Arc<dyn ArgumentAccessor>) -> Self {
        self.accessor = accessor;
        self
    }

    /// 기본 재진입 정책 설정
    pub fn with_context_policy(mut self, policy: ContextPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// 태그 레지스트리
    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    /// 배치 알고리즘 집합
    pub fn algorithms(&self) -> &AlgorithmSet {
        &self.algorithms
    }

    /// 호출의 라우팅 규칙 해석
    pub fn resolve(&self, invocation: &Invocation) -> Option<Arc<RouteSpec>> {
        self.registry.resolve(invocation.declaration())
    }

    /// 호출의 배치 계산 (컨텍스트는 건드리지 않음)
    ///
    /// 태그가 없는 선언은 `Ok(None)`입니다.
    pub fn place(&self, invocation: &Invocation) -> RouterResult<Option<Placement>> {
        let Some(spec) = self.resolve(invocation) else {
            return Ok(None);
        };
        let mut tracker = PhaseTracker::new(invocation.declaration());
        self.place_spec(invocation, spec, &mut tracker).map(Some)
    }

    fn place_spec(
        &self,
        invocation: &Invocation,
        spec: Arc<RouteSpec>,
        tracker: &mut PhaseTracker<'_>,
    ) -> RouterResult<Placement> {
        let mut shard = None;
        let accessor = match &spec.key {
            Some(key) => key.clone(),
            None => {
                let config = spec.shard_config(self.provider.as_ref())?;
                let key = spec.key_accessor(&config)?;
                shard = Some(config);
                key
            }
        };
        let key = self.accessor.extract(invocation.args(), &accessor)?;
        tracker.advance(RoutePhase::KeyExtracted);

        let shard = match shard {
            Some(shard) => shard,
            None => spec.shard_config(self.provider.as_ref())?,
        };
        let algorithm = self.algorithms.get(spec.algorithm.as_deref())?;
        let coordinate = algorithm.place(&key, &shard, spec.split_table)?;
        tracker.advance(RoutePhase::Placed);

        tracing::debug!(
            declaration = %invocation.declaration(),
            resource = %spec.resource,
            algorithm = algorithm.name(),
            db_index = coordinate.db_index,
            table_index = ?coordinate.table_index,
            "Placed routing key"
        );

        Ok(Placement {
            algorithm: algorithm.name().to_string(),
            spec,
            key,
            coordinate,
        })
    }

    /// 진입 판정까지 수행
    ///
    /// `Ok(None)`이면 컨텍스트 없이 실행하거나(태그 없음) 바깥 컨텍스트를
    /// 그대로 사용합니다(재사용).
    fn prepare<'a>(
        &self,
        invocation: &'a Invocation,
    ) -> RouterResult<(PhaseTracker<'a>, Option<Admission>)> {
        let mut tracker = PhaseTracker::new(invocation.declaration());
        let Some(spec) = self.resolve(invocation) else {
            self.counters.passthrough.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(declaration = %invocation.declaration(), "Untagged, passing through");
            return Ok((tracker, None));
        };

        let policy = spec.policy.unwrap_or(self.default_policy);
        if policy == ContextPolicy::ReuseOuter {
            if let Some(outer) = RoutingContext::get() {
                self.counters.reused.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    declaration = %invocation.declaration(),
                    outer = %outer,
                    "Reusing outer routing context"
                );
                return Ok((tracker, None));
            }
        }

        let admitted = self
            .place_spec(invocation, spec, &mut tracker)
            .and_then(|placement| RoutingContext::admit(placement.coordinate, policy));
        match admitted {
            Ok(admission) => {
                self.counters.routed.fetch_add(1, Ordering::Relaxed);
                Ok((tracker, Some(admission)))
            }
            Err(err) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                tracker.fail(&err);
                Err(err)
            }
        }
    }

    /// 동기 작업을 라우팅하여 실행
    ///
    /// 작업 실행 중에는 [`RoutingContext::get`]이 배치 좌표를 반환하며,
    /// 작업이 반환하거나 패닉하면 컨텍스트가 해제됩니다.
    /// 라우팅 에러는 `E::from`으로 변환되고 작업은 실행되지 않습니다.
    pub fn route<T, E, F>(&self, invocation: &Invocation, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RouterError>,
    {
        let (mut tracker, admission) = self.prepare(invocation)?;
        let Some(admission) = admission else {
            return op();
        };

        tracker.advance(RoutePhase::Dispatched);
        let result = RoutingContext::enter(admission, op);
        tracker.advance(RoutePhase::Cleared);
        result
    }

    /// 비동기 작업을 라우팅하여 실행
    ///
    /// 좌표는 작업 퓨처를 따라 이동하므로 워커 스레드가 바뀌어도 유지됩니다.
    /// 이 퓨처가 완료 전에 drop되면(취소/타임아웃) 컨텍스트도 함께 사라집니다.
    pub async fn route_async<T, E, F, Fut>(&self, invocation: &Invocation, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<RouterError>,
    {
        let (mut tracker, admission) = self.prepare(invocation)?;
        let Some(admission) = admission else {
            return op().await;
        };

        tracker.advance(RoutePhase::Dispatched);
        let result = match admission {
            Admission::Publish(c) => RoutingContext::scope(c, op()).await,
            Admission::Reuse(_) => op().await,
        };
        tracker.advance(RoutePhase::Cleared);
        result
    }

    /// 라우터 메트릭
    pub fn metrics(&self) -> RouterMetrics {
        RouterMetrics {
            routed: self.counters.routed.load(Ordering::Relaxed),
            reused: self.counters.reused.load(Ordering::Relaxed),
            passthrough: self.counters.passthrough.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            cached_specs: self.registry.cached_len(),
        }
    }
}

impl fmt::Debug for ShardRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardRouter")
            .field("algorithms", &self.algorithms)
            .field("default_policy", &self.default_policy)
            .finish()
    }
}

/// 라우터 메트릭
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterMetrics {
    /// 새 컨텍스트로 라우팅된 호출 수
    pub routed: u64,
    /// 바깥 컨텍스트를 재사용한 호출 수
    pub reused: u64,
    /// 태그 없이 통과한 호출 수
    pub passthrough: u64,
    /// 라우팅 실패 수
    pub failed: u64,
    /// 캐시된 규칙 수
    pub cached_specs: usize,
}

// ============================================================================
// Tests
// ============================================================================
