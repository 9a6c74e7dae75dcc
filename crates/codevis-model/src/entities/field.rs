use std::sync::Arc;

use smallvec::SmallVec;

use crate::entities::TypeRef;
use crate::enums::{AccessSpecifier, NodeKind};
use crate::lockable::{Entity, EntityState};

#[derive(Default)]
pub struct FieldData {
    pub signature: String,
    pub access: AccessSpecifier,
    pub is_static: bool,
    pub(crate) parent: Option<TypeRef>,
    pub(crate) variable_types: SmallVec<[TypeRef; 4]>,
}

impl EntityState for FieldData {
    const KIND: NodeKind = NodeKind::Field;
}

impl FieldData {
    pub fn parent(&self) -> Option<&TypeRef> {
        self.parent.as_ref()
    }

    pub fn variable_types(&self) -> &[TypeRef] {
        &self.variable_types
    }

    pub fn add_variable_type(&mut self, ty: &TypeRef) {
        if !self.variable_types.iter().any(|t| Arc::ptr_eq(t, ty)) {
            self.variable_types.push(Arc::clone(ty));
        }
    }
}

pub type FieldObject = Entity<FieldData>;
pub type FieldRef = Arc<FieldObject>;
