//! Per-entity reader/writer locks.
//!
//! An [`Entity`] owns an immutable identity (qualified name, name) and a
//! `RwLock` around its mutable state. Whenever two entities are locked at
//! once they are acquired in a fixed global order: node kind, then qualified
//! name, then address.

use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::enums::NodeKind;

/// Mutable state of one entity kind.
pub trait EntityState: Default + Send + Sync + 'static {
    const KIND: NodeKind;
}

pub struct Entity<T> {
    qualified_name: String,
    name: String,
    state: RwLock<T>,
}

impl<T: EntityState> Entity<T> {
    pub(crate) fn new(qualified_name: impl Into<String>, name: impl Into<String>, state: T) -> Arc<Self> {
        Arc::new(Self {
            qualified_name: qualified_name.into(),
            name: name.into(),
            state: RwLock::new(state),
        })
    }

    /// Identity key; never changes, readable without locking.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        T::KIND
    }

    /// Shared lock. A poisoned lock is recovered: a panicking writer cannot
    /// leave a relationship list half-inserted.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_ro_lock<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.read())
    }

    pub fn with_rw_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.write())
    }

    pub(crate) fn reset(&self) {
        *self.write() = T::default();
    }

    fn address(&self) -> usize {
        self as *const Self as *const () as usize
    }

    fn lock_order<U: EntityState>(&self, other: &Entity<U>) -> Ordering {
        T::KIND
            .cmp(&U::KIND)
            .then_with(|| self.qualified_name.cmp(&other.qualified_name))
            .then_with(|| self.address().cmp(&other.address()))
    }
}

impl<T: EntityState> std::fmt::Debug for Entity<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("kind", &T::KIND)
            .field("qualified_name", &self.qualified_name)
            .finish()
    }
}

/// True when both references point at the same entity.
pub fn same_entity<A: EntityState, B: EntityState>(a: &Entity<A>, b: &Entity<B>) -> bool {
    a.address() == b.address()
}

/// Exclusive locks on two distinct entities, taken in the global order.
///
/// Panics if `a` and `b` are the same entity: relationship code must filter
/// self-edges before locking.
pub fn with_rw_lock_two<A: EntityState, B: EntityState, R>(
    a: &Entity<A>,
    b: &Entity<B>,
    f: impl FnOnce(&mut A, &mut B) -> R,
) -> R {
    assert!(
        !same_entity(a, b),
        "attempted to lock {} twice",
        a.qualified_name()
    );
    if a.lock_order(b) == Ordering::Less {
        let mut ga = a.write();
        let mut gb = b.write();
        f(&mut ga, &mut gb)
    } else {
        let mut gb = b.write();
        let mut ga = a.write();
        f(&mut ga, &mut gb)
    }
}

/// Shared locks on two entities, taken in the global order.
pub fn with_ro_lock_two<A: EntityState, B: EntityState, R>(
    a: &Entity<A>,
    b: &Entity<B>,
    f: impl FnOnce(&A, &B) -> R,
) -> R {
    if a.lock_order(b) == Ordering::Less {
        let ga = a.read();
        let gb = b.read();
        f(&ga, &gb)
    } else {
        let gb = b.read();
        let ga = a.read();
        f(&ga, &gb)
    }
}

/// Push `item` unless the same entity is already present.
pub(crate) fn push_unique<T: EntityState>(list: &mut Vec<Arc<Entity<T>>>, item: &Arc<Entity<T>>) -> bool {
    if list.iter().any(|x| Arc::ptr_eq(x, item)) {
        return false;
    }
    list.push(Arc::clone(item));
    true
}

pub(crate) fn remove_item<T: EntityState>(list: &mut Vec<Arc<Entity<T>>>, item: &Arc<Entity<T>>) -> bool {
    let before = list.len();
    list.retain(|x| !Arc::ptr_eq(x, item));
    before != list.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        hits: usize,
    }

    impl EntityState for Probe {
        const KIND: NodeKind = NodeKind::Package;
    }

    #[test]
    fn scoped_helpers_release_locks() {
        let a = Entity::new("a", "a", Probe::default());
        a.with_rw_lock(|p| p.hits += 1);
        assert_eq!(a.with_ro_lock(|p| p.hits), 1);
        // The write lock must be free again.
        assert_eq!(a.write().hits, 1);
    }

    #[test]
    fn lock_two_passes_arguments_in_call_order() {
        let a = Entity::new("zzz", "zzz", Probe::default());
        let b = Entity::new("aaa", "aaa", Probe::default());
        with_rw_lock_two(&a, &b, |pa, pb| {
            pa.hits = 1;
            pb.hits = 2;
        });
        assert_eq!(a.read().hits, 1);
        assert_eq!(b.read().hits, 2);
    }

    #[test]
    #[should_panic(expected = "twice")]
    fn lock_two_rejects_same_entity() {
        let a = Entity::new("a", "a", Probe::default());
        with_rw_lock_two(&a, &a, |_, _| ());
    }

    #[test]
    fn lock_survives_poisoning() {
        let a = Entity::new("a", "a", Probe::default());
        let shared = Arc::clone(&a);
        let _ = std::thread::spawn(move || {
            let _guard = shared.write();
            panic!("boom");
        })
        .join();
        a.with_rw_lock(|p| p.hits = 7);
        assert_eq!(a.read().hits, 7);
    }
}
