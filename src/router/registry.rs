//! Route Registry
//!
//! 선언(타입/메서드)별 라우팅 태그 등록 및 규칙 캐시

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::spec::{RouteSpec, RouteTag, TargetKind};

// ============================================================================
// DeclarationId - 선언 식별자
// ============================================================================

/// 라우팅 대상 작업의 선언 식별자
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclarationId {
    /// 타입 이름
    pub type_name: String,
    /// 메서드 이름
    pub method: String,
}

impl DeclarationId {
    /// 새 식별자 생성
    pub fn new(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.type_name, self.method)
    }
}

// ============================================================================
// RouteRegistry
// ============================================================================

/// 라우팅 태그 레지스트리
///
/// 런타임 리플렉션 대신 명시적 등록으로 태그를 수집합니다.
/// 메서드 태그가 있으면 해당 메서드에 한해 타입 태그를 덮어씁니다.
///
/// 해석된 규칙은 선언당 한 번 캐시됩니다. 동시에 처음 해석하는 경우
/// 중복 계산이 생길 수 있지만 결과가 같으므로 먼저 들어간 값이 유지됩니다.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    /// 타입별 태그
    type_tags: RwLock<HashMap<String, RouteTag>>,
    /// 메서드별 태그
    method_tags: RwLock<HashMap<DeclarationId, RouteTag>>,
    /// 해석된 규칙 캐시 (태그 없는 선언은 None)
    cache: RwLock<HashMap<DeclarationId, Option<Arc<RouteSpec>>>>,
}

impl RouteRegistry {
    /// 빈 레지스트리 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 타입 태그 등록
    pub fn register_type(&self, type_name: impl Into<String>, tag: RouteTag) {
        let type_name = type_name.into();
        self.type_tags.write().insert(type_name.clone(), tag);
        self.cache.write().retain(|decl, _| decl.type_name != type_name);
    }

    /// 메서드 태그 등록
    pub fn register_method(
        &self,
        type_name: impl Into<String>,
        method: impl Into<String>,
        tag: RouteTag,
    ) {
        let decl = DeclarationId::new(type_name, method);
        self.method_tags.write().insert(decl.clone(), tag);
        self.cache.write().remove(&decl);
    }

    /// 태그 등록 여부
    pub fn is_tagged(&self, decl: &DeclarationId) -> bool {
        self.method_tags.read().contains_key(decl)
            || self.type_tags.read().contains_key(&decl.type_name)
    }

    /// 선언의 유효 태그 조회 (메서드 태그가 타입 태그보다 우선)
    pub fn effective_tag(&self, decl: &DeclarationId) -> Option<(TargetKind, RouteTag)> {
        let type_tag = self.type_tags.read().get(&decl.type_name).cloned();
        let method_tag = self.method_tags.read().get(decl).cloned();

        match (method_tag, type_tag) {
            (Some(m), Some(t)) => Some((TargetKind::Method, m.merged_over(&t))),
            (Some(m), None) => Some((TargetKind::Method, m)),
            (None, Some(t)) => Some((TargetKind::Type, t)),
            (None, None) => None,
        }
    }

    /// 라우팅 규칙 해석 (캐시)
    ///
    /// 태그가 없는 선언은 `None`입니다. 규칙은 태그만으로 결정되며 샤드 설정은
    /// 포함하지 않으므로, 설정이 아직 등록되지 않아도 해석은 실패하지 않습니다.
    pub fn resolve(&self, decl: &DeclarationId) -> Option<Arc<RouteSpec>> {
        if let Some(cached) = self.cache.read().get(decl) {
            return cached.clone();
        }

        let spec = self
            .effective_tag(decl)
            .map(|(kind, tag)| Arc::new(RouteSpec::from_tag(kind, &decl.type_name, &tag)));

        self.cache
            .write()
            .entry(decl.clone())
            .or_insert(spec)
            .clone()
    }

    /// 캐시된 규칙 수
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::spec::KeyAccessor;

    #[test]
    fn test_untagged_declaration() {
        let registry = RouteRegistry::new();
        let decl = DeclarationId::new("UserRepository", "find");
        assert!(!registry.is_tagged(&decl));
        assert!(registry.resolve(&decl).is_none());
    }

    #[test]
    fn test_type_tag_applies_to_all_methods() {
        let registry = RouteRegistry::new();
        registry.register_type("OrderRepository", RouteTag::new().resource("orders").key_position(0));

        for method in ["insert", "find", "delete"] {
            let decl = DeclarationId::new("OrderRepository", method);
            let spec = registry.resolve(&decl).unwrap();
            assert_eq!(spec.target_kind, TargetKind::Type);
            assert_eq!(spec.resource, "orders");
            assert!(!spec.split_table);
        }
    }

    #[test]
    fn test_method_tag_overrides_type_tag() {
        let registry = RouteRegistry::new();
        registry.register_type(
            "OrderRepository",
            RouteTag::new().resource("orders").key_field("userId").split_table(false),
        );
        registry.register_method("OrderRepository", "insert", RouteTag::new().split_table(true));

        let insert = registry
            .resolve(&DeclarationId::new("OrderRepository", "insert"))
            .unwrap();
        assert_eq!(insert.target_kind, TargetKind::Method);
        assert!(insert.split_table);
        assert_eq!(insert.key, Some(KeyAccessor::field("userId")));

        let find = registry
            .resolve(&DeclarationId::new("OrderRepository", "find"))
            .unwrap();
        assert_eq!(find.target_kind, TargetKind::Type);
        assert!(!find.split_table);
    }

    #[test]
    fn test_method_tag_without_type_tag() {
        let registry = RouteRegistry::new();
        registry.register_method("Ledger", "append", RouteTag::new().key_position(0));

        let decl = DeclarationId::new("Ledger", "append");
        let spec = registry.resolve(&decl).unwrap();
        assert_eq!(spec.resource, "Ledger");
        assert!(registry
            .resolve(&DeclarationId::new("Ledger", "read"))
            .is_none());
    }

    #[test]
    fn test_resolution_is_cached() {
        let registry = RouteRegistry::new();
        registry.register_type("OrderRepository", RouteTag::new().resource("orders"));
        let decl = DeclarationId::new("OrderRepository", "insert");

        let first = registry.resolve(&decl).unwrap();
        let second = registry.resolve(&decl).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.cached_len(), 1);
    }

    #[test]
    fn test_registration_invalidates_cache() {
        let registry = RouteRegistry::new();
        registry.register_type("OrderRepository", RouteTag::new().resource("orders"));
        let decl = DeclarationId::new("OrderRepository", "insert");
        assert!(!registry.resolve(&decl).unwrap().split_table);

        registry.register_method("OrderRepository", "insert", RouteTag::new().split_table(true));
        assert!(registry.resolve(&decl).unwrap().split_table);
    }

    #[test]
    fn test_concurrent_first_resolution() {
        let registry = Arc::new(RouteRegistry::new());
        registry.register_type("OrderRepository", RouteTag::new().resource("orders"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    registry
                        .resolve(&DeclarationId::new("OrderRepository", "insert"))
                        .unwrap()
                })
            })
            .collect();

        let specs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let cached = registry
            .resolve(&DeclarationId::new("OrderRepository", "insert"))
            .unwrap();
        for spec in specs {
            assert_eq!(*spec, *cached);
        }
        assert_eq!(registry.cached_len(), 1);
    }

    #[test]
    fn test_declaration_display() {
        assert_eq!(
            DeclarationId::new("OrderRepository", "insert").to_string(),
            "OrderRepository::insert"
        );
    }
}
