//! 라우팅 컨텍스트
//!
//! 현재 호출 범위(또는 비동기 태스크)에서 선택된 샤드 좌표를 보관합니다.
//!
//! 좌표는 태스크 로컬 저장소에 범위 단위로 게시됩니다. 비동기 작업은
//! [`RoutingContext::scope`]로 감싼 퓨처가 poll되는 동안에만, 동기 작업은
//! [`RoutingContext::sync_scope`]에 넘긴 클로저가 실행되는 동안에만 좌표가
//! 보입니다. 태스크가 다른 워커 스레드로 옮겨져도 좌표는 태스크를 따라가고,
//! 같은 스레드에서 번갈아 poll되는 다른 태스크에는 보이지 않습니다.
//!
//! 해제는 범위 종료 시 자동으로 한 번 수행됩니다 (정상 반환, 에러, 패닉,
//! 퓨처 drop 모두).

use std::future::Future;

use serde::{Deserialize, Serialize};

use super::super::error::{RouterError, RouterResult};
use super::super::types::ShardCoordinate;

tokio::task_local! {
    static CURRENT: ShardCoordinate;
}

// ============================================================================
// ContextPolicy - 재진입 정책
// ============================================================================

/// 중첩 라우팅 호출 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextPolicy {
    /// 바깥 컨텍스트 재사용 (기본값). 안쪽 호출의 배치는 무시됩니다.
    #[default]
    ReuseOuter,
    /// 활성 컨텍스트가 있으면 에러
    ErrorOnConflict,
    /// 안쪽 범위 동안 새 좌표를 게시하고 종료 시 바깥 좌표 복원
    Stack,
}

/// 컨텍스트 진입 판정 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// 새 좌표를 게시
    Publish(ShardCoordinate),
    /// 바깥 좌표를 그대로 사용
    Reuse(ShardCoordinate),
}

impl Admission {
    /// 호출 중 유효한 좌표
    pub fn coordinate(&self) -> ShardCoordinate {
        match self {
            Admission::Publish(c) | Admission::Reuse(c) => *c,
        }
    }

    /// 바깥 좌표 재사용 여부
    pub fn is_reused(&self) -> bool {
        matches!(self, Admission::Reuse(_))
    }
}

// ============================================================================
// RoutingContext
// ============================================================================

/// 라우팅 컨텍스트 접근자
pub struct RoutingContext;

impl RoutingContext {
    /// 현재 활성 좌표 조회
    ///
    /// 라우팅 범위 밖에서는 `None`을 반환하며, 디스패치 계층은 이를
    /// 기본(비샤딩) 데이터 소스를 사용하라는 뜻으로 해석해야 합니다.
    pub fn get() -> Option<ShardCoordinate> {
        CURRENT.try_with(|c| *c).ok()
    }

    /// 활성 컨텍스트 존재 여부
    pub fn is_active() -> bool {
        Self::get().is_some()
    }

    /// 정책에 따라 새 좌표의 진입 여부 판정
    pub fn admit(coordinate: ShardCoordinate, policy: ContextPolicy) -> RouterResult<Admission> {
        match (Self::get(), policy) {
            (None, _) | (Some(_), ContextPolicy::Stack) => Ok(Admission::Publish(coordinate)),
            (Some(outer), ContextPolicy::ReuseOuter) => Ok(Admission::Reuse(outer)),
            (Some(outer), ContextPolicy::ErrorOnConflict) => {
                Err(RouterError::context_conflict(outer, coordinate))
            }
        }
    }

    /// 정책 판정 후 동기 작업 실행
    ///
    /// 게시가 허용되면 `op` 실행 동안 좌표가 보이고, 재사용이면 바깥 좌표가
    /// 그대로 유지됩니다. 충돌이면 `op`은 실행되지 않습니다.
    pub fn set<R>(
        coordinate: ShardCoordinate,
        policy: ContextPolicy,
        op: impl FnOnce() -> R,
    ) -> RouterResult<R> {
        Ok(Self::enter(Self::admit(coordinate, policy)?, op))
    }

    /// 판정 결과대로 동기 작업 실행
    pub fn enter<R>(admission: Admission, op: impl FnOnce() -> R) -> R {
        match admission {
            Admission::Publish(c) => Self::sync_scope(c, op),
            Admission::Reuse(_) => op(),
        }
    }

    /// 좌표를 게시한 채로 동기 작업 실행
    ///
    /// 정책 판정은 하지 않습니다. 바깥 좌표는 `op` 종료 후 복원됩니다.
    pub fn sync_scope<R>(coordinate: ShardCoordinate, op: impl FnOnce() -> R) -> R {
        CURRENT.sync_scope(coordinate, op)
    }

    /// 퓨처에 좌표를 부착 (비동기 호출용)
    ///
    /// 정책 판정은 호출자가 [`RoutingContext::admit`]으로 먼저 수행합니다.
    pub fn scope<F: Future>(
        coordinate: ShardCoordinate,
        future: F,
    ) -> impl Future<Output = F::Output> {
        CURRENT.scope(coordinate, future)
    }

    /// 현재 좌표를 퓨처에 전파
    ///
    /// `tokio::spawn` 등으로 분리된 태스크는 부모의 좌표를 보지 못하므로
    /// 명시적으로 감싸야 합니다. 활성 컨텍스트가 없으면 그대로 실행됩니다.
    pub fn inherit<F: Future>(future: F) -> impl Future<Output = F::Output> {
        let coordinate = Self::get();
        async move {
            match coordinate {
                Some(c) => CURRENT.scope(c, future).await,
                None => future.await,
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
