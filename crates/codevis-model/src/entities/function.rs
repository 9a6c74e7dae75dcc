use std::sync::Arc;

use crate::entities::NamespaceRef;
use crate::enums::NodeKind;
use crate::lockable::{Entity, EntityState};
use crate::relations::peer_relation;

/// A free function.
#[derive(Default)]
pub struct FunctionData {
    pub signature: String,
    pub return_type: String,
    pub template_parameters: String,
    pub(crate) namespace: Option<NamespaceRef>,
    pub(crate) callees: Vec<FunctionRef>,
    pub(crate) callers: Vec<FunctionRef>,
}

impl EntityState for FunctionData {
    const KIND: NodeKind = NodeKind::Function;
}

impl FunctionData {
    pub fn namespace(&self) -> Option<&NamespaceRef> {
        self.namespace.as_ref()
    }

    pub fn callees(&self) -> &[FunctionRef] {
        &self.callees
    }

    pub fn callers(&self) -> &[FunctionRef] {
        &self.callers
    }
}

peer_relation!(CALL: FunctionData => FunctionData, callees, callers);

pub type FunctionObject = Entity<FunctionData>;
pub type FunctionRef = Arc<FunctionObject>;

impl FunctionObject {
    /// `source` calls `target`.
    pub fn add_dependency(source: &FunctionRef, target: &FunctionRef) -> bool {
        CALL.add(source, target)
    }
}
