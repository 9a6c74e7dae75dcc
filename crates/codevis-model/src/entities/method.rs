use std::sync::Arc;

use smallvec::SmallVec;

use crate::entities::TypeRef;
use crate::enums::{AccessSpecifier, NodeKind};
use crate::lockable::{Entity, EntityState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MethodFlags {
    pub is_virtual: bool,
    pub is_pure: bool,
    pub is_static: bool,
    pub is_const: bool,
}

#[derive(Default)]
pub struct MethodData {
    pub signature: String,
    pub return_type: String,
    pub template_parameters: String,
    pub access: AccessSpecifier,
    pub flags: MethodFlags,
    pub(crate) parent: Option<TypeRef>,
    pub(crate) argument_types: SmallVec<[TypeRef; 4]>,
}

impl EntityState for MethodData {
    const KIND: NodeKind = NodeKind::Method;
}

impl MethodData {
    pub fn parent(&self) -> Option<&TypeRef> {
        self.parent.as_ref()
    }

    /// Types named by the parameter list and return type.
    pub fn argument_types(&self) -> &[TypeRef] {
        &self.argument_types
    }

    pub fn add_argument_type(&mut self, ty: &TypeRef) {
        if !self.argument_types.iter().any(|t| Arc::ptr_eq(t, ty)) {
            self.argument_types.push(Arc::clone(ty));
        }
    }
}

pub type MethodObject = Entity<MethodData>;
pub type MethodRef = Arc<MethodObject>;
