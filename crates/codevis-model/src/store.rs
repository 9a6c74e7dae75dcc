//! The object store: qualified-name keyed maps of every entity kind.
//!
//! Two lock tiers. The store's `RwLock<Registry>` guards insertion and lookup;
//! each entity's own lock guards its fields. A thread may lock entities while
//! holding the store lock, never the other way round.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use codevis_core::errors::StorageError;
use codevis_core::types::collections::FxHashMap;

use crate::entities::*;
use crate::enums::{AccessSpecifier, ErrorKind, State, UdtKind};
use crate::lockable::{Entity, EntityState};
use crate::persistence::{DatabaseReader, DatabaseWriter};

mod removal;

/// Parameters for registering a type.
#[derive(Debug, Clone, Copy)]
pub struct TypeDecl<'a> {
    pub qualified_name: &'a str,
    pub name: &'a str,
    pub kind: UdtKind,
    pub access: AccessSpecifier,
    pub namespace: Option<&'a NamespaceRef>,
    pub package: Option<&'a PackageRef>,
    pub parent: Option<&'a TypeRef>,
}

#[derive(Debug, Clone, Copy)]
pub struct FunctionDecl<'a> {
    pub qualified_name: &'a str,
    pub name: &'a str,
    pub signature: &'a str,
    pub return_type: &'a str,
    pub template_parameters: &'a str,
    pub namespace: Option<&'a NamespaceRef>,
}

#[derive(Debug, Clone, Copy)]
pub struct MethodDecl<'a> {
    pub qualified_name: &'a str,
    pub name: &'a str,
    pub signature: &'a str,
    pub return_type: &'a str,
    pub template_parameters: &'a str,
    pub access: AccessSpecifier,
    pub flags: MethodFlags,
    pub parent: Option<&'a TypeRef>,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDecl<'a> {
    pub qualified_name: &'a str,
    pub name: &'a str,
    pub signature: &'a str,
    pub access: AccessSpecifier,
    pub is_static: bool,
    pub parent: Option<&'a TypeRef>,
}

#[derive(Debug, Clone, Copy)]
pub struct VariableDecl<'a> {
    pub qualified_name: &'a str,
    pub name: &'a str,
    pub signature: &'a str,
    pub is_global: bool,
    pub namespace: Option<&'a NamespaceRef>,
}

/// The maps behind the store lock.
#[derive(Default)]
pub struct Registry {
    repositories: FxHashMap<String, RepositoryRef>,
    packages: FxHashMap<String, PackageRef>,
    components: FxHashMap<String, ComponentRef>,
    files: FxHashMap<String, FileRef>,
    namespaces: FxHashMap<String, NamespaceRef>,
    types: FxHashMap<String, TypeRef>,
    functions: FxHashMap<String, FunctionRef>,
    methods: FxHashMap<String, MethodRef>,
    fields: FxHashMap<String, FieldRef>,
    variables: FxHashMap<String, VariableRef>,
    errors: FxHashMap<String, ErrorRef>,
}

fn lookup<T: EntityState>(map: &FxHashMap<String, Arc<Entity<T>>>, key: &str) -> Option<Arc<Entity<T>>> {
    map.get(key).cloned()
}

fn sorted<T: EntityState>(map: &FxHashMap<String, Arc<Entity<T>>>) -> Vec<Arc<Entity<T>>> {
    let mut items: Vec<_> = map.values().cloned().collect();
    items.sort_by(|a, b| a.qualified_name().cmp(b.qualified_name()));
    items
}

impl Registry {
    pub fn repository(&self, qualified_name: &str) -> Option<RepositoryRef> {
        lookup(&self.repositories, qualified_name)
    }

    pub fn package(&self, qualified_name: &str) -> Option<PackageRef> {
        lookup(&self.packages, qualified_name)
    }

    pub fn component(&self, qualified_name: &str) -> Option<ComponentRef> {
        lookup(&self.components, qualified_name)
    }

    pub fn file(&self, qualified_name: &str) -> Option<FileRef> {
        lookup(&self.files, qualified_name)
    }

    pub fn namespace(&self, qualified_name: &str) -> Option<NamespaceRef> {
        lookup(&self.namespaces, qualified_name)
    }

    pub fn type_(&self, qualified_name: &str) -> Option<TypeRef> {
        lookup(&self.types, qualified_name)
    }

    pub fn field(&self, qualified_name: &str) -> Option<FieldRef> {
        lookup(&self.fields, qualified_name)
    }

    pub fn variable(&self, qualified_name: &str) -> Option<VariableRef> {
        lookup(&self.variables, qualified_name)
    }

    pub fn function(
        &self,
        qualified_name: &str,
        signature: &str,
        template_parameters: &str,
        return_type: &str,
    ) -> Option<FunctionRef> {
        lookup(
            &self.functions,
            &function_key(qualified_name, signature, template_parameters, return_type),
        )
    }

    pub fn method(
        &self,
        qualified_name: &str,
        signature: &str,
        template_parameters: &str,
        return_type: &str,
    ) -> Option<MethodRef> {
        lookup(
            &self.methods,
            &function_key(qualified_name, signature, template_parameters, return_type),
        )
    }

    pub fn repositories(&self) -> &FxHashMap<String, RepositoryRef> {
        &self.repositories
    }

    pub fn packages(&self) -> &FxHashMap<String, PackageRef> {
        &self.packages
    }

    pub fn components(&self) -> &FxHashMap<String, ComponentRef> {
        &self.components
    }

    pub fn files(&self) -> &FxHashMap<String, FileRef> {
        &self.files
    }

    pub fn namespaces(&self) -> &FxHashMap<String, NamespaceRef> {
        &self.namespaces
    }

    pub fn types(&self) -> &FxHashMap<String, TypeRef> {
        &self.types
    }

    /// Keyed by `function_key`, not by qualified name.
    pub fn functions(&self) -> &FxHashMap<String, FunctionRef> {
        &self.functions
    }

    /// Keyed by `function_key`, not by qualified name.
    pub fn methods(&self) -> &FxHashMap<String, MethodRef> {
        &self.methods
    }

    pub fn fields(&self) -> &FxHashMap<String, FieldRef> {
        &self.fields
    }

    pub fn variables(&self) -> &FxHashMap<String, VariableRef> {
        &self.variables
    }

    /// Keyed by `error_key`.
    pub fn errors(&self) -> &FxHashMap<String, ErrorRef> {
        &self.errors
    }

    pub fn sorted_files(&self) -> Vec<FileRef> {
        sorted(&self.files)
    }

    pub fn sorted_packages(&self) -> Vec<PackageRef> {
        sorted(&self.packages)
    }

    pub fn sorted_components(&self) -> Vec<ComponentRef> {
        sorted(&self.components)
    }

    pub fn sorted_types(&self) -> Vec<TypeRef> {
        sorted(&self.types)
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
            && self.packages.is_empty()
            && self.components.is_empty()
            && self.files.is_empty()
            && self.namespaces.is_empty()
            && self.types.is_empty()
            && self.functions.is_empty()
            && self.methods.is_empty()
            && self.fields.is_empty()
            && self.variables.is_empty()
            && self.errors.is_empty()
    }

    pub fn get_or_add_repository(&mut self, name: &str, disk_path: &str) -> RepositoryRef {
        if let Some(existing) = self.repositories.get(name) {
            return Arc::clone(existing);
        }
        let repository = Entity::new(
            name,
            name,
            RepositoryData {
                disk_path: disk_path.to_string(),
                ..Default::default()
            },
        );
        self.repositories.insert(name.to_string(), Arc::clone(&repository));
        repository
    }

    pub fn get_or_add_package(
        &mut self,
        qualified_name: &str,
        name: &str,
        disk_path: &str,
        parent: Option<&PackageRef>,
        repository: Option<&RepositoryRef>,
    ) -> PackageRef {
        if let Some(existing) = self.packages.get(qualified_name) {
            return Arc::clone(existing);
        }
        let package = Entity::new(
            qualified_name,
            name,
            PackageData {
                disk_path: disk_path.to_string(),
                parent: parent.cloned(),
                repository: repository.cloned(),
                ..Default::default()
            },
        );
        if let Some(parent) = parent {
            parent.with_rw_lock(|p| p.add_child(&package));
        }
        if let Some(repository) = repository {
            repository.with_rw_lock(|r| r.add_child(&package));
        }
        self.packages.insert(qualified_name.to_string(), Arc::clone(&package));
        package
    }

    pub fn get_or_add_component(
        &mut self,
        qualified_name: &str,
        name: &str,
        package: Option<&PackageRef>,
    ) -> ComponentRef {
        if let Some(existing) = self.components.get(qualified_name) {
            return Arc::clone(existing);
        }
        let component = Entity::new(
            qualified_name,
            name,
            ComponentData {
                package: package.cloned(),
                ..Default::default()
            },
        );
        if let Some(package) = package {
            package.with_rw_lock(|p| p.add_component(&component));
        }
        self.components.insert(qualified_name.to_string(), Arc::clone(&component));
        component
    }

    pub fn get_or_add_file(
        &mut self,
        qualified_name: &str,
        name: &str,
        is_header: bool,
        hash: &str,
        package: Option<&PackageRef>,
        component: Option<&ComponentRef>,
    ) -> FileRef {
        if let Some(existing) = self.files.get(qualified_name) {
            return Arc::clone(existing);
        }
        let file = Entity::new(
            qualified_name,
            name,
            FileData {
                is_header,
                hash: hash.to_string(),
                package: package.cloned(),
                component: component.cloned(),
                ..Default::default()
            },
        );
        if let Some(component) = component {
            component.with_rw_lock(|c| c.add_file(&file));
        }
        self.files.insert(qualified_name.to_string(), Arc::clone(&file));
        file
    }

    pub fn get_or_add_namespace(
        &mut self,
        qualified_name: &str,
        name: &str,
        parent: Option<&NamespaceRef>,
    ) -> NamespaceRef {
        if let Some(existing) = self.namespaces.get(qualified_name) {
            return Arc::clone(existing);
        }
        let namespace = Entity::new(
            qualified_name,
            name,
            NamespaceData {
                parent: parent.cloned(),
                ..Default::default()
            },
        );
        if let Some(parent) = parent {
            parent.with_rw_lock(|p| p.add_child(&namespace));
        }
        self.namespaces.insert(qualified_name.to_string(), Arc::clone(&namespace));
        namespace
    }

    pub fn get_or_add_type(&mut self, decl: TypeDecl<'_>) -> TypeRef {
        if let Some(existing) = self.types.get(decl.qualified_name) {
            return Arc::clone(existing);
        }
        let ty = Entity::new(
            decl.qualified_name,
            decl.name,
            TypeData {
                kind: decl.kind,
                access: decl.access,
                namespace: decl.namespace.cloned(),
                package: decl.package.cloned(),
                parent: decl.parent.cloned(),
                ..Default::default()
            },
        );
        if let Some(namespace) = decl.namespace {
            namespace.with_rw_lock(|n| n.add_type(&ty));
        }
        if let Some(package) = decl.package {
            package.with_rw_lock(|p| p.add_type(&ty));
        }
        if let Some(parent) = decl.parent {
            parent.with_rw_lock(|p| p.add_child(&ty));
        }
        self.types.insert(decl.qualified_name.to_string(), Arc::clone(&ty));
        ty
    }

    pub fn get_or_add_function(&mut self, decl: FunctionDecl<'_>) -> FunctionRef {
        let key = function_key(
            decl.qualified_name,
            decl.signature,
            decl.template_parameters,
            decl.return_type,
        );
        if let Some(existing) = self.functions.get(&key) {
            return Arc::clone(existing);
        }
        let function = Entity::new(
            decl.qualified_name,
            decl.name,
            FunctionData {
                signature: decl.signature.to_string(),
                return_type: decl.return_type.to_string(),
                template_parameters: decl.template_parameters.to_string(),
                namespace: decl.namespace.cloned(),
                ..Default::default()
            },
        );
        if let Some(namespace) = decl.namespace {
            namespace.with_rw_lock(|n| n.add_function(&function));
        }
        self.functions.insert(key, Arc::clone(&function));
        function
    }

    pub fn get_or_add_method(&mut self, decl: MethodDecl<'_>) -> MethodRef {
        let key = function_key(
            decl.qualified_name,
            decl.signature,
            decl.template_parameters,
            decl.return_type,
        );
        if let Some(existing) = self.methods.get(&key) {
            return Arc::clone(existing);
        }
        let method = Entity::new(
            decl.qualified_name,
            decl.name,
            MethodData {
                signature: decl.signature.to_string(),
                return_type: decl.return_type.to_string(),
                template_parameters: decl.template_parameters.to_string(),
                access: decl.access,
                flags: decl.flags,
                parent: decl.parent.cloned(),
                ..Default::default()
            },
        );
        if let Some(parent) = decl.parent {
            parent.with_rw_lock(|t| t.add_method(&method));
        }
        self.methods.insert(key, Arc::clone(&method));
        method
    }

    pub fn get_or_add_field(&mut self, decl: FieldDecl<'_>) -> FieldRef {
        if let Some(existing) = self.fields.get(decl.qualified_name) {
            return Arc::clone(existing);
        }
        let field = Entity::new(
            decl.qualified_name,
            decl.name,
            FieldData {
                signature: decl.signature.to_string(),
                access: decl.access,
                is_static: decl.is_static,
                parent: decl.parent.cloned(),
                ..Default::default()
            },
        );
        if let Some(parent) = decl.parent {
            parent.with_rw_lock(|t| t.add_field(&field));
        }
        self.fields.insert(decl.qualified_name.to_string(), Arc::clone(&field));
        field
    }

    pub fn get_or_add_variable(&mut self, decl: VariableDecl<'_>) -> VariableRef {
        if let Some(existing) = self.variables.get(decl.qualified_name) {
            return Arc::clone(existing);
        }
        let variable = Entity::new(
            decl.qualified_name,
            decl.name,
            VariableData {
                signature: decl.signature.to_string(),
                is_global: decl.is_global,
                namespace: decl.namespace.cloned(),
            },
        );
        if let Some(namespace) = decl.namespace {
            namespace.with_rw_lock(|n| n.add_variable(&variable));
        }
        self.variables.insert(decl.qualified_name.to_string(), Arc::clone(&variable));
        variable
    }

    pub fn get_or_add_error(
        &mut self,
        kind: ErrorKind,
        qualified_name: &str,
        message: &str,
        file_name: &str,
    ) -> ErrorRef {
        let key = error_key(qualified_name, message, file_name);
        if let Some(existing) = self.errors.get(&key) {
            return Arc::clone(existing);
        }
        let error = Entity::new(
            qualified_name,
            qualified_name,
            ErrorData {
                kind,
                message: message.to_string(),
                file_name: file_name.to_string(),
            },
        );
        self.errors.insert(key, Arc::clone(&error));
        error
    }

    /// Drops every entity. Entity state is reset first so the `Arc` cycles
    /// between related entities are broken.
    pub fn clear(&mut self) {
        fn drain<T: EntityState>(map: &mut FxHashMap<String, Arc<Entity<T>>>) {
            for entity in map.values() {
                entity.reset();
            }
            map.clear();
        }
        drain(&mut self.repositories);
        drain(&mut self.packages);
        drain(&mut self.components);
        drain(&mut self.files);
        drain(&mut self.namespaces);
        drain(&mut self.types);
        drain(&mut self.functions);
        drain(&mut self.methods);
        drain(&mut self.fields);
        drain(&mut self.variables);
        drain(&mut self.errors);
    }
}

/// Root aggregate of the dependency graph.
#[derive(Default)]
pub struct ObjectStore {
    registry: RwLock<Registry>,
    state: RwLock<State>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store-level shared lock.
    pub fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store-level exclusive lock.
    pub fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_ro_lock<R>(&self, f: impl FnOnce(&Registry) -> R) -> R {
        f(&self.read())
    }

    pub fn with_rw_lock<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> R {
        f(&mut self.write())
    }

    pub fn state(&self) -> State {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_state(&self, state: State) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    pub fn get_or_add_repository(&self, name: &str, disk_path: &str) -> RepositoryRef {
        self.with_rw_lock(|r| r.get_or_add_repository(name, disk_path))
    }

    pub fn get_or_add_package(
        &self,
        qualified_name: &str,
        name: &str,
        disk_path: &str,
        parent: Option<&PackageRef>,
        repository: Option<&RepositoryRef>,
    ) -> PackageRef {
        self.with_rw_lock(|r| r.get_or_add_package(qualified_name, name, disk_path, parent, repository))
    }

    pub fn get_or_add_component(&self, qualified_name: &str, name: &str, package: Option<&PackageRef>) -> ComponentRef {
        self.with_rw_lock(|r| r.get_or_add_component(qualified_name, name, package))
    }

    pub fn get_or_add_file(
        &self,
        qualified_name: &str,
        name: &str,
        is_header: bool,
        hash: &str,
        package: Option<&PackageRef>,
        component: Option<&ComponentRef>,
    ) -> FileRef {
        self.with_rw_lock(|r| r.get_or_add_file(qualified_name, name, is_header, hash, package, component))
    }

    pub fn get_or_add_namespace(&self, qualified_name: &str, name: &str, parent: Option<&NamespaceRef>) -> NamespaceRef {
        self.with_rw_lock(|r| r.get_or_add_namespace(qualified_name, name, parent))
    }

    pub fn get_or_add_type(&self, decl: TypeDecl<'_>) -> TypeRef {
        self.with_rw_lock(|r| r.get_or_add_type(decl))
    }

    pub fn get_or_add_function(&self, decl: FunctionDecl<'_>) -> FunctionRef {
        self.with_rw_lock(|r| r.get_or_add_function(decl))
    }

    pub fn get_or_add_method(&self, decl: MethodDecl<'_>) -> MethodRef {
        self.with_rw_lock(|r| r.get_or_add_method(decl))
    }

    pub fn get_or_add_field(&self, decl: FieldDecl<'_>) -> FieldRef {
        self.with_rw_lock(|r| r.get_or_add_field(decl))
    }

    pub fn get_or_add_variable(&self, decl: VariableDecl<'_>) -> VariableRef {
        self.with_rw_lock(|r| r.get_or_add_variable(decl))
    }

    pub fn get_or_add_error(&self, kind: ErrorKind, qualified_name: &str, message: &str, file_name: &str) -> ErrorRef {
        self.with_rw_lock(|r| r.get_or_add_error(kind, qualified_name, message, file_name))
    }

    pub fn package(&self, qualified_name: &str) -> Option<PackageRef> {
        self.with_ro_lock(|r| r.package(qualified_name))
    }

    pub fn component(&self, qualified_name: &str) -> Option<ComponentRef> {
        self.with_ro_lock(|r| r.component(qualified_name))
    }

    pub fn file(&self, qualified_name: &str) -> Option<FileRef> {
        self.with_ro_lock(|r| r.file(qualified_name))
    }

    pub fn namespace(&self, qualified_name: &str) -> Option<NamespaceRef> {
        self.with_ro_lock(|r| r.namespace(qualified_name))
    }

    pub fn type_(&self, qualified_name: &str) -> Option<TypeRef> {
        self.with_ro_lock(|r| r.type_(qualified_name))
    }

    pub fn repository(&self, qualified_name: &str) -> Option<RepositoryRef> {
        self.with_ro_lock(|r| r.repository(qualified_name))
    }

    /// Snapshot of all files, sorted by qualified name.
    pub fn files(&self) -> Vec<FileRef> {
        self.with_ro_lock(Registry::sorted_files)
    }

    pub fn packages(&self) -> Vec<PackageRef> {
        self.with_ro_lock(Registry::sorted_packages)
    }

    pub fn components(&self) -> Vec<ComponentRef> {
        self.with_ro_lock(Registry::sorted_components)
    }

    pub fn types(&self) -> Vec<TypeRef> {
        self.with_ro_lock(Registry::sorted_types)
    }

    pub fn clear(&self) {
        self.with_rw_lock(Registry::clear);
        self.set_state(State::NoneReady);
    }

    /// Loads `path` into the store. On failure the store is left empty.
    pub fn read_from_database(&self, reader: &dyn DatabaseReader, path: &Path) -> Result<(), StorageError> {
        let mut registry = self.write();
        match reader.read_into(path, &mut registry) {
            Ok(()) => Ok(()),
            Err(e) => {
                registry.clear();
                Err(e)
            }
        }
    }

    /// Holds the store read lock for the whole write.
    pub fn write_to_database(&self, writer: &mut dyn DatabaseWriter) -> Result<(), StorageError> {
        let registry = self.read();
        writer.write_from(&registry)
    }
}

impl Drop for ObjectStore {
    fn drop(&mut self) {
        self.registry
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
