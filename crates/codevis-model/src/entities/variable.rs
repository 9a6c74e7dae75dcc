use std::sync::Arc;

use crate::entities::NamespaceRef;
use crate::enums::NodeKind;
use crate::lockable::{Entity, EntityState};

/// A namespace-scope variable.
#[derive(Default)]
pub struct VariableData {
    pub signature: String,
    pub is_global: bool,
    pub(crate) namespace: Option<NamespaceRef>,
}

impl EntityState for VariableData {
    const KIND: NodeKind = NodeKind::Variable;
}

impl VariableData {
    pub fn namespace(&self) -> Option<&NamespaceRef> {
        self.namespace.as_ref()
    }
}

pub type VariableObject = Entity<VariableData>;
pub type VariableRef = Arc<VariableObject>;
