//! Entity state types and their relationship operations.
//!
//! Each kind `X` has a state struct `XData`, the lockable entity alias
//! `XObject = Entity<XData>`, and the shared handle `XRef = Arc<XObject>`.

mod component;
mod error;
mod field;
mod file;
mod function;
mod method;
mod namespace;
mod package;
mod repository;
mod type_object;
mod variable;

pub use component::{ComponentData, ComponentObject, ComponentRef};
pub use error::{ErrorData, ErrorObject, ErrorRef};
pub use field::{FieldData, FieldObject, FieldRef};
pub use file::{FileData, FileObject, FileRef};
pub use function::{FunctionData, FunctionObject, FunctionRef};
pub use method::{MethodData, MethodFlags, MethodObject, MethodRef};
pub use namespace::{NamespaceData, NamespaceObject, NamespaceRef};
pub use package::{PackageData, PackageObject, PackageRef};
pub use repository::{RepositoryData, RepositoryObject, RepositoryRef};
pub use type_object::{TypeData, TypeObject, TypeRef};
pub use variable::{VariableData, VariableObject, VariableRef};

pub(crate) use file::{FILE_NAMESPACE, FILE_TYPE};
pub(crate) use function::CALL;
pub(crate) use type_object::{IS_A, TYPE_COMPONENT, USES_IN_IMPLEMENTATION, USES_IN_INTERFACE};

/// Storage key for functions and methods, so overloads and specializations
/// get distinct entries.
pub fn function_key(qualified_name: &str, signature: &str, template_parameters: &str, return_type: &str) -> String {
    format!("{qualified_name}\n{signature}\n{template_parameters}\n{return_type}")
}

/// Storage key for errors.
pub fn error_key(qualified_name: &str, message: &str, file_name: &str) -> String {
    format!("{qualified_name}\n{message}\n{file_name}")
}
