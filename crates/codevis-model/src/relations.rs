//! Symmetric peer relationships.
//!
//! A peer relationship stores the target in the source's forward list and the
//! source in the target's reverse list. Both sides change under the two
//! entities' locks, taken in the global lock order.

use std::sync::Arc;

use crate::lockable::{push_unique, remove_item, same_entity, with_rw_lock_two, Entity, EntityState};

/// Accessors for the forward list on `A` and the reverse list on `B`.
pub struct PeerRelation<A, B> {
    pub(crate) forward: fn(&A) -> &[Arc<Entity<B>>],
    pub(crate) forward_mut: fn(&mut A) -> &mut Vec<Arc<Entity<B>>>,
    pub(crate) reverse_mut: fn(&mut B) -> &mut Vec<Arc<Entity<A>>>,
}

impl<A: EntityState, B: EntityState> PeerRelation<A, B> {
    /// Returns false for self-edges and for edges that already exist.
    pub fn add(&self, source: &Arc<Entity<A>>, target: &Arc<Entity<B>>) -> bool {
        if same_entity(source, target) {
            return false;
        }

        let exists = source.with_ro_lock(|s| {
            (self.forward)(s).iter().any(|t| Arc::ptr_eq(t, target))
        });
        if exists {
            return false;
        }

        with_rw_lock_two(source, target, |s, t| {
            let added = push_unique((self.forward_mut)(s), target);
            push_unique((self.reverse_mut)(t), source);
            added
        })
    }

    pub fn remove(&self, source: &Arc<Entity<A>>, target: &Arc<Entity<B>>) -> bool {
        if same_entity(source, target) {
            return false;
        }
        with_rw_lock_two(source, target, |s, t| {
            let removed = remove_item((self.forward_mut)(s), target);
            remove_item((self.reverse_mut)(t), source);
            removed
        })
    }
}

/// Declares a `PeerRelation` constant over two list fields.
macro_rules! peer_relation {
    ($(#[$meta:meta])* $name:ident: $a:ty => $b:ty, $forward:ident, $reverse:ident) => {
        $(#[$meta])*
        pub const $name: $crate::relations::PeerRelation<$a, $b> = $crate::relations::PeerRelation {
            forward: {
                fn forward(s: &$a) -> &[std::sync::Arc<$crate::lockable::Entity<$b>>] {
                    &s.$forward
                }
                forward
            },
            forward_mut: {
                fn forward_mut(s: &mut $a) -> &mut Vec<std::sync::Arc<$crate::lockable::Entity<$b>>> {
                    &mut s.$forward
                }
                forward_mut
            },
            reverse_mut: {
                fn reverse_mut(s: &mut $b) -> &mut Vec<std::sync::Arc<$crate::lockable::Entity<$a>>> {
                    &mut s.$reverse
                }
                reverse_mut
            },
        };
    };
}

pub(crate) use peer_relation;
