//! Writes an object store into a code database.
//!
//! Entities are upserted by qualified name (functions and methods by their
//! full overload key) with referenced parents written first, so writing into
//! a database that already holds data unions the two. Edges use
//! `INSERT OR IGNORE`. One store is written in one transaction.

use std::path::Path;
use std::time::Instant;

use codevis_core::errors::StorageError;
use codevis_core::tracing::metrics;
use codevis_core::types::collections::FxHashMap;
use codevis_model::entities::*;
use codevis_model::{DatabaseWriter, Registry};
use rusqlite::Connection;
use tracing::info;

use crate::connection::CodebaseDb;
use crate::queries::edges::{insert_edge, EdgeTable};
use crate::queries::logical::{self, ClassRow, ErrorRow, FieldRow, FunctionRow, MethodRow, NamespaceRow, VariableRow};
use crate::queries::physical::{self, ComponentRow, FileRow, PackageRow, RepositoryRow};

pub struct SqliteWriter {
    db: CodebaseDb,
}

impl SqliteWriter {
    pub fn create_or_open(path: &Path) -> Result<Self, StorageError> {
        Ok(Self {
            db: CodebaseDb::create_or_open(path)?,
        })
    }

    pub fn new(db: CodebaseDb) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &CodebaseDb {
        &self.db
    }
}

impl DatabaseWriter for SqliteWriter {
    fn write_from(&mut self, registry: &Registry) -> Result<(), StorageError> {
        let start = Instant::now();
        self.db.with_transaction(|tx| WriteContext::new(tx).write_all(registry))?;
        if self.db.path().is_some() {
            self.db.checkpoint()?;
        }
        info!(
            { metrics::STORE_WRITE_TIME } = start.elapsed().as_millis() as u64,
            files = registry.files().len(),
            types = registry.types().len(),
            "store written"
        );
        Ok(())
    }
}

/// Row ids already resolved during one write, keyed like the registry maps.
struct WriteContext<'a> {
    conn: &'a Connection,
    repositories: FxHashMap<String, i64>,
    packages: FxHashMap<String, i64>,
    components: FxHashMap<String, i64>,
    files: FxHashMap<String, i64>,
    namespaces: FxHashMap<String, i64>,
    types: FxHashMap<String, i64>,
    functions: FxHashMap<String, i64>,
    methods: FxHashMap<String, i64>,
    fields: FxHashMap<String, i64>,
    variables: FxHashMap<String, i64>,
}

impl<'a> WriteContext<'a> {
    fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            repositories: FxHashMap::default(),
            packages: FxHashMap::default(),
            components: FxHashMap::default(),
            files: FxHashMap::default(),
            namespaces: FxHashMap::default(),
            types: FxHashMap::default(),
            functions: FxHashMap::default(),
            methods: FxHashMap::default(),
            fields: FxHashMap::default(),
            variables: FxHashMap::default(),
        }
    }

    fn write_all(&mut self, registry: &Registry) -> Result<(), StorageError> {
        for repository in registry.repositories().values() {
            self.repository(repository)?;
        }
        for package in registry.packages().values() {
            self.package(package)?;
        }
        for component in registry.components().values() {
            self.component(component)?;
        }
        for file in registry.files().values() {
            self.file(file)?;
        }
        for error in registry.errors().values() {
            let data = error.read();
            logical::insert_error_if_missing(
                self.conn,
                &ErrorRow {
                    kind: data.kind as i64,
                    qualified_name: error.qualified_name().to_string(),
                    message: data.message.clone(),
                    file_name: data.file_name.clone(),
                },
            )?;
        }
        for namespace in registry.namespaces().values() {
            self.namespace(namespace)?;
        }
        for variable in registry.variables().values() {
            self.variable(variable)?;
        }
        for function in registry.functions().values() {
            self.function(function)?;
        }
        for ty in registry.types().values() {
            self.user_defined_type(ty)?;
        }
        for field in registry.fields().values() {
            self.field(field)?;
        }
        for method in registry.methods().values() {
            self.method(method)?;
        }

        self.write_edges(registry)
    }

    fn write_edges(&mut self, registry: &Registry) -> Result<(), StorageError> {
        for package in registry.packages().values() {
            let source = self.package(package)?;
            let deps = package.read().forward_dependencies().to_vec();
            for dep in &deps {
                let target = self.package(dep)?;
                insert_edge(self.conn, EdgeTable::PackageDependency, source, target)?;
            }
        }

        for component in registry.components().values() {
            let source = self.component(component)?;
            let deps = component.read().forward_dependencies().to_vec();
            for dep in &deps {
                let target = self.component(dep)?;
                insert_edge(self.conn, EdgeTable::ComponentDependency, source, target)?;
            }
        }

        for file in registry.files().values() {
            let source = self.file(file)?;
            let (includes, namespaces, functions) = {
                let data = file.read();
                (
                    data.forward_includes().to_vec(),
                    data.namespaces().to_vec(),
                    data.global_functions().to_vec(),
                )
            };
            for include in &includes {
                let target = self.file(include)?;
                insert_edge(self.conn, EdgeTable::Include, source, target)?;
            }
            for namespace in &namespaces {
                let target = self.namespace(namespace)?;
                insert_edge(self.conn, EdgeTable::NamespaceFile, source, target)?;
            }
            for function in &functions {
                let target = self.function(function)?;
                insert_edge(self.conn, EdgeTable::GlobalFunctionFile, source, target)?;
            }
        }

        for ty in registry.types().values() {
            let source = self.user_defined_type(ty)?;
            let (bases, interface, implementation, components, files) = {
                let data = ty.read();
                (
                    data.superclasses().to_vec(),
                    data.uses_in_the_interface().to_vec(),
                    data.uses_in_the_implementation().to_vec(),
                    data.components().to_vec(),
                    data.files().to_vec(),
                )
            };
            for (table, targets) in [
                (EdgeTable::ClassHierarchy, &bases),
                (EdgeTable::UsesInTheInterface, &interface),
                (EdgeTable::UsesInTheImplementation, &implementation),
            ] {
                for target in targets {
                    let target = self.user_defined_type(target)?;
                    insert_edge(self.conn, table, source, target)?;
                }
            }
            for component in &components {
                let target = self.component(component)?;
                insert_edge(self.conn, EdgeTable::UdtComponent, source, target)?;
            }
            for file in &files {
                let target = self.file(file)?;
                insert_edge(self.conn, EdgeTable::ClassSourceFile, source, target)?;
            }
        }

        for field in registry.fields().values() {
            let source = self.field(field)?;
            let types = field.read().variable_types().to_vec();
            for ty in &types {
                let target = self.user_defined_type(ty)?;
                insert_edge(self.conn, EdgeTable::FieldType, source, target)?;
            }
        }

        for method in registry.methods().values() {
            let source = self.method(method)?;
            let types = method.read().argument_types().to_vec();
            for ty in &types {
                let target = self.user_defined_type(ty)?;
                insert_edge(self.conn, EdgeTable::MethodArgumentClass, source, target)?;
            }
        }

        for function in registry.functions().values() {
            let source = self.function(function)?;
            let callees = function.read().callees().to_vec();
            for callee in &callees {
                let target = self.function(callee)?;
                insert_edge(self.conn, EdgeTable::FunctionCalls, source, target)?;
            }
        }

        Ok(())
    }

    fn repository(&mut self, repository: &RepositoryRef) -> Result<i64, StorageError> {
        let qn = repository.qualified_name();
        if let Some(id) = self.repositories.get(qn) {
            return Ok(*id);
        }
        let id = match physical::find_repository_id(self.conn, qn)? {
            Some(id) => id,
            None => physical::insert_repository(
                self.conn,
                &RepositoryRow {
                    name: repository.name().to_string(),
                    qualified_name: qn.to_string(),
                    disk_path: repository.read().disk_path.clone(),
                },
            )?,
        };
        self.repositories.insert(qn.to_string(), id);
        Ok(id)
    }

    fn package(&mut self, package: &PackageRef) -> Result<i64, StorageError> {
        let qn = package.qualified_name();
        if let Some(id) = self.packages.get(qn) {
            return Ok(*id);
        }
        let id = match physical::find_package_id(self.conn, qn)? {
            Some(id) => id,
            None => {
                let (parent, repository, disk_path) = {
                    let data = package.read();
                    (data.parent().cloned(), data.repository().cloned(), data.disk_path.clone())
                };
                let parent_id = match &parent {
                    Some(parent) => Some(self.package(parent)?),
                    None => None,
                };
                let repository_id = match &repository {
                    Some(repository) => Some(self.repository(repository)?),
                    None => None,
                };
                physical::insert_package(
                    self.conn,
                    &PackageRow {
                        parent_id,
                        repository_id,
                        name: package.name().to_string(),
                        qualified_name: qn.to_string(),
                        disk_path,
                    },
                )?
            }
        };
        self.packages.insert(qn.to_string(), id);
        Ok(id)
    }

    fn component(&mut self, component: &ComponentRef) -> Result<i64, StorageError> {
        let qn = component.qualified_name();
        if let Some(id) = self.components.get(qn) {
            return Ok(*id);
        }
        let id = match physical::find_component_id(self.conn, qn)? {
            Some(id) => id,
            None => {
                let package = component.read().package().cloned();
                let package_id = match &package {
                    Some(package) => Some(self.package(package)?),
                    None => None,
                };
                physical::insert_component(
                    self.conn,
                    &ComponentRow {
                        package_id,
                        name: component.name().to_string(),
                        qualified_name: qn.to_string(),
                    },
                )?
            }
        };
        self.components.insert(qn.to_string(), id);
        Ok(id)
    }

    fn file(&mut self, file: &FileRef) -> Result<i64, StorageError> {
        let qn = file.qualified_name();
        if let Some(id) = self.files.get(qn) {
            return Ok(*id);
        }
        let id = match physical::find_file_id(self.conn, qn)? {
            Some(id) => id,
            None => {
                let (package, component, is_header, hash) = {
                    let data = file.read();
                    (
                        data.package().cloned(),
                        data.component().cloned(),
                        data.is_header,
                        data.hash.clone(),
                    )
                };
                let package_id = match &package {
                    Some(package) => Some(self.package(package)?),
                    None => None,
                };
                let component_id = match &component {
                    Some(component) => Some(self.component(component)?),
                    None => None,
                };
                physical::insert_file(
                    self.conn,
                    &FileRow {
                        package_id,
                        component_id,
                        name: file.name().to_string(),
                        qualified_name: qn.to_string(),
                        is_header,
                        hash,
                    },
                )?
            }
        };
        self.files.insert(qn.to_string(), id);
        Ok(id)
    }

    fn namespace(&mut self, namespace: &NamespaceRef) -> Result<i64, StorageError> {
        let qn = namespace.qualified_name();
        if let Some(id) = self.namespaces.get(qn) {
            return Ok(*id);
        }
        let id = match logical::find_namespace_id(self.conn, qn)? {
            Some(id) => id,
            None => {
                let parent = namespace.read().parent().cloned();
                let parent_id = match &parent {
                    Some(parent) => Some(self.namespace(parent)?),
                    None => None,
                };
                logical::insert_namespace(
                    self.conn,
                    &NamespaceRow {
                        parent_id,
                        name: namespace.name().to_string(),
                        qualified_name: qn.to_string(),
                    },
                )?
            }
        };
        self.namespaces.insert(qn.to_string(), id);
        Ok(id)
    }

    fn variable(&mut self, variable: &VariableRef) -> Result<i64, StorageError> {
        let qn = variable.qualified_name();
        if let Some(id) = self.variables.get(qn) {
            return Ok(*id);
        }
        let id = match logical::find_variable_id(self.conn, qn)? {
            Some(id) => id,
            None => {
                let (namespace, signature, is_global) = {
                    let data = variable.read();
                    (data.namespace().cloned(), data.signature.clone(), data.is_global)
                };
                let namespace_id = match &namespace {
                    Some(namespace) => Some(self.namespace(namespace)?),
                    None => None,
                };
                logical::insert_variable(
                    self.conn,
                    &VariableRow {
                        namespace_id,
                        name: variable.name().to_string(),
                        qualified_name: qn.to_string(),
                        signature,
                        is_global,
                    },
                )?
            }
        };
        self.variables.insert(qn.to_string(), id);
        Ok(id)
    }

    fn function(&mut self, function: &FunctionRef) -> Result<i64, StorageError> {
        let (namespace, signature, return_type, template_parameters) = {
            let data = function.read();
            (
                data.namespace().cloned(),
                data.signature.clone(),
                data.return_type.clone(),
                data.template_parameters.clone(),
            )
        };
        let qn = function.qualified_name();
        let key = function_key(qn, &signature, &template_parameters, &return_type);
        if let Some(id) = self.functions.get(&key) {
            return Ok(*id);
        }
        let id = match logical::find_function_id(self.conn, qn, &signature, &template_parameters, &return_type)? {
            Some(id) => id,
            None => {
                let namespace_id = match &namespace {
                    Some(namespace) => Some(self.namespace(namespace)?),
                    None => None,
                };
                logical::insert_function(
                    self.conn,
                    &FunctionRow {
                        namespace_id,
                        name: function.name().to_string(),
                        qualified_name: qn.to_string(),
                        signature,
                        return_type,
                        template_parameters,
                    },
                )?
            }
        };
        self.functions.insert(key, id);
        Ok(id)
    }

    fn user_defined_type(&mut self, ty: &TypeRef) -> Result<i64, StorageError> {
        let qn = ty.qualified_name();
        if let Some(id) = self.types.get(qn) {
            return Ok(*id);
        }
        let id = match logical::find_class_id(self.conn, qn)? {
            Some(id) => id,
            None => {
                let (namespace, parent, package, kind, access) = {
                    let data = ty.read();
                    (
                        data.namespace().cloned(),
                        data.parent().cloned(),
                        data.package().cloned(),
                        data.kind,
                        data.access,
                    )
                };
                let namespace_id = match &namespace {
                    Some(namespace) => Some(self.namespace(namespace)?),
                    None => None,
                };
                let parent_class_id = match &parent {
                    Some(parent) => Some(self.user_defined_type(parent)?),
                    None => None,
                };
                let package_id = match &package {
                    Some(package) => Some(self.package(package)?),
                    None => None,
                };
                logical::insert_class(
                    self.conn,
                    &ClassRow {
                        namespace_id,
                        parent_class_id,
                        package_id,
                        name: ty.name().to_string(),
                        qualified_name: qn.to_string(),
                        kind: kind as i64,
                        access: access as i64,
                    },
                )?
            }
        };
        self.types.insert(qn.to_string(), id);
        Ok(id)
    }

    fn field(&mut self, field: &FieldRef) -> Result<i64, StorageError> {
        let qn = field.qualified_name();
        if let Some(id) = self.fields.get(qn) {
            return Ok(*id);
        }
        let id = match logical::find_field_id(self.conn, qn)? {
            Some(id) => id,
            None => {
                let (parent, signature, access, is_static) = {
                    let data = field.read();
                    (data.parent().cloned(), data.signature.clone(), data.access, data.is_static)
                };
                let class_id = match &parent {
                    Some(parent) => Some(self.user_defined_type(parent)?),
                    None => None,
                };
                logical::insert_field(
                    self.conn,
                    &FieldRow {
                        class_id,
                        name: field.name().to_string(),
                        qualified_name: qn.to_string(),
                        signature,
                        access: access as i64,
                        is_static,
                    },
                )?
            }
        };
        self.fields.insert(qn.to_string(), id);
        Ok(id)
    }

    fn method(&mut self, method: &MethodRef) -> Result<i64, StorageError> {
        let (parent, signature, return_type, template_parameters, access, flags) = {
            let data = method.read();
            (
                data.parent().cloned(),
                data.signature.clone(),
                data.return_type.clone(),
                data.template_parameters.clone(),
                data.access,
                data.flags,
            )
        };
        let qn = method.qualified_name();
        let key = function_key(qn, &signature, &template_parameters, &return_type);
        if let Some(id) = self.methods.get(&key) {
            return Ok(*id);
        }
        let id = match logical::find_method_id(self.conn, qn, &signature, &template_parameters, &return_type)? {
            Some(id) => id,
            None => {
                let class_id = match &parent {
                    Some(parent) => Some(self.user_defined_type(parent)?),
                    None => None,
                };
                logical::insert_method(
                    self.conn,
                    &MethodRow {
                        class_id,
                        name: method.name().to_string(),
                        qualified_name: qn.to_string(),
                        signature,
                        return_type,
                        template_parameters,
                        access: access as i64,
                        is_virtual: flags.is_virtual,
                        is_pure: flags.is_pure,
                        is_static: flags.is_static,
                        is_const: flags.is_const,
                    },
                )?
            }
        };
        self.methods.insert(key, id);
        Ok(id)
    }
}
