//! Rebuilds an object store from a code database.

use std::path::Path;

use codevis_core::errors::StorageError;
use codevis_core::types::collections::FxHashMap;
use codevis_model::entities::*;
use codevis_model::store::{FieldDecl, FunctionDecl, MethodDecl, TypeDecl, VariableDecl};
use codevis_model::{AccessSpecifier, DatabaseReader, ErrorKind, Registry, UdtKind};
use rusqlite::Connection;
use tracing::debug;

use crate::connection::CodebaseDb;
use crate::queries::edges::{load_edges, EdgeTable};
use crate::queries::logical::{self, ClassRow, NamespaceRow};
use crate::queries::physical::{self, PackageRow};

#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteReader;

impl SqliteReader {
    pub fn new() -> Self {
        Self
    }
}

impl DatabaseReader for SqliteReader {
    fn read_into(&self, path: &Path, registry: &mut Registry) -> Result<(), StorageError> {
        let db = CodebaseDb::open_existing(path)?;
        read_connection(db.conn(), registry)?;
        debug!(path = %path.display(), files = registry.files().len(), "database read");
        Ok(())
    }
}

/// Loads every table of `conn` into `registry`.
pub fn read_connection(conn: &Connection, registry: &mut Registry) -> Result<(), StorageError> {
    let mut ctx = ReadContext {
        registry,
        repositories: FxHashMap::default(),
        packages: FxHashMap::default(),
        components: FxHashMap::default(),
        files: FxHashMap::default(),
        namespaces: FxHashMap::default(),
        types: FxHashMap::default(),
        functions: FxHashMap::default(),
        methods: FxHashMap::default(),
        fields: FxHashMap::default(),
    };
    ctx.load_physical(conn)?;
    ctx.load_logical(conn)?;
    ctx.load_edges(conn)
}

fn resolve<T: Clone>(map: &FxHashMap<i64, T>, table: &'static str, id: i64) -> Result<T, StorageError> {
    map.get(&id).cloned().ok_or(StorageError::DanglingReference { table, id })
}

fn resolve_opt<T: Clone>(
    map: &FxHashMap<i64, T>,
    table: &'static str,
    id: Option<i64>,
) -> Result<Option<T>, StorageError> {
    id.map(|id| resolve(map, table, id)).transpose()
}

struct ReadContext<'a> {
    registry: &'a mut Registry,
    repositories: FxHashMap<i64, RepositoryRef>,
    packages: FxHashMap<i64, PackageRef>,
    components: FxHashMap<i64, ComponentRef>,
    files: FxHashMap<i64, FileRef>,
    namespaces: FxHashMap<i64, NamespaceRef>,
    types: FxHashMap<i64, TypeRef>,
    functions: FxHashMap<i64, FunctionRef>,
    methods: FxHashMap<i64, MethodRef>,
    fields: FxHashMap<i64, FieldRef>,
}

impl ReadContext<'_> {
    fn load_physical(&mut self, conn: &Connection) -> Result<(), StorageError> {
        for (id, row) in physical::load_repositories(conn)? {
            let repository = self
                .registry
                .get_or_add_repository(&row.qualified_name, &row.disk_path);
            self.repositories.insert(id, repository);
        }

        let packages: FxHashMap<i64, PackageRow> = physical::load_packages(conn)?.into_iter().collect();
        let mut ids: Vec<i64> = packages.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            self.package(id, &packages, 0)?;
        }

        for (id, row) in physical::load_components(conn)? {
            let package = resolve_opt(&self.packages, "source_package", row.package_id)?;
            let component = self
                .registry
                .get_or_add_component(&row.qualified_name, &row.name, package.as_ref());
            self.components.insert(id, component);
        }

        for (id, row) in physical::load_files(conn)? {
            let package = resolve_opt(&self.packages, "source_package", row.package_id)?;
            let component = resolve_opt(&self.components, "source_component", row.component_id)?;
            let file = self.registry.get_or_add_file(
                &row.qualified_name,
                &row.name,
                row.is_header,
                &row.hash,
                package.as_ref(),
                component.as_ref(),
            );
            self.files.insert(id, file);
        }
        Ok(())
    }

    /// Parents are created before children. `depth` bounds the recursion on a
    /// corrupt parent cycle.
    fn package(
        &mut self,
        id: i64,
        rows: &FxHashMap<i64, PackageRow>,
        depth: usize,
    ) -> Result<PackageRef, StorageError> {
        if let Some(package) = self.packages.get(&id) {
            return Ok(package.clone());
        }
        let row = rows
            .get(&id)
            .filter(|_| depth <= rows.len())
            .ok_or(StorageError::DanglingReference {
                table: "source_package",
                id,
            })?;
        let parent = match row.parent_id {
            Some(parent_id) => Some(self.package(parent_id, rows, depth + 1)?),
            None => None,
        };
        let repository = resolve_opt(&self.repositories, "source_repository", row.repository_id)?;
        let package = self.registry.get_or_add_package(
            &row.qualified_name,
            &row.name,
            &row.disk_path,
            parent.as_ref(),
            repository.as_ref(),
        );
        self.packages.insert(id, package.clone());
        Ok(package)
    }

    fn namespace(
        &mut self,
        id: i64,
        rows: &FxHashMap<i64, NamespaceRow>,
        depth: usize,
    ) -> Result<NamespaceRef, StorageError> {
        if let Some(namespace) = self.namespaces.get(&id) {
            return Ok(namespace.clone());
        }
        let row = rows
            .get(&id)
            .filter(|_| depth <= rows.len())
            .ok_or(StorageError::DanglingReference {
                table: "namespace_declaration",
                id,
            })?;
        let parent = match row.parent_id {
            Some(parent_id) => Some(self.namespace(parent_id, rows, depth + 1)?),
            None => None,
        };
        let namespace = self
            .registry
            .get_or_add_namespace(&row.qualified_name, &row.name, parent.as_ref());
        self.namespaces.insert(id, namespace.clone());
        Ok(namespace)
    }

    fn user_defined_type(
        &mut self,
        id: i64,
        rows: &FxHashMap<i64, ClassRow>,
        depth: usize,
    ) -> Result<TypeRef, StorageError> {
        if let Some(ty) = self.types.get(&id) {
            return Ok(ty.clone());
        }
        let row = rows
            .get(&id)
            .filter(|_| depth <= rows.len())
            .ok_or(StorageError::DanglingReference {
                table: "class_declaration",
                id,
            })?;
        let parent = match row.parent_class_id {
            Some(parent_id) => Some(self.user_defined_type(parent_id, rows, depth + 1)?),
            None => None,
        };
        let namespace = resolve_opt(&self.namespaces, "namespace_declaration", row.namespace_id)?;
        let package = resolve_opt(&self.packages, "source_package", row.package_id)?;
        let ty = self.registry.get_or_add_type(TypeDecl {
            qualified_name: &row.qualified_name,
            name: &row.name,
            kind: UdtKind::from_i64(row.kind),
            access: AccessSpecifier::from_i64(row.access),
            namespace: namespace.as_ref(),
            package: package.as_ref(),
            parent: parent.as_ref(),
        });
        self.types.insert(id, ty.clone());
        Ok(ty)
    }

    fn load_logical(&mut self, conn: &Connection) -> Result<(), StorageError> {
        for row in logical::load_errors(conn)? {
            self.registry.get_or_add_error(
                ErrorKind::from_i64(row.kind),
                &row.qualified_name,
                &row.message,
                &row.file_name,
            );
        }

        let namespaces: FxHashMap<i64, NamespaceRow> = logical::load_namespaces(conn)?.into_iter().collect();
        let mut ids: Vec<i64> = namespaces.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            self.namespace(id, &namespaces, 0)?;
        }

        for (_, row) in logical::load_variables(conn)? {
            let namespace = resolve_opt(&self.namespaces, "namespace_declaration", row.namespace_id)?;
            self.registry.get_or_add_variable(VariableDecl {
                qualified_name: &row.qualified_name,
                name: &row.name,
                signature: &row.signature,
                is_global: row.is_global,
                namespace: namespace.as_ref(),
            });
        }

        for (id, row) in logical::load_functions(conn)? {
            let namespace = resolve_opt(&self.namespaces, "namespace_declaration", row.namespace_id)?;
            let function = self.registry.get_or_add_function(FunctionDecl {
                qualified_name: &row.qualified_name,
                name: &row.name,
                signature: &row.signature,
                return_type: &row.return_type,
                template_parameters: &row.template_parameters,
                namespace: namespace.as_ref(),
            });
            self.functions.insert(id, function);
        }

        let classes: FxHashMap<i64, ClassRow> = logical::load_classes(conn)?.into_iter().collect();
        let mut ids: Vec<i64> = classes.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            self.user_defined_type(id, &classes, 0)?;
        }

        for (id, row) in logical::load_fields(conn)? {
            let parent = resolve_opt(&self.types, "class_declaration", row.class_id)?;
            let field = self.registry.get_or_add_field(FieldDecl {
                qualified_name: &row.qualified_name,
                name: &row.name,
                signature: &row.signature,
                access: AccessSpecifier::from_i64(row.access),
                is_static: row.is_static,
                parent: parent.as_ref(),
            });
            self.fields.insert(id, field);
        }

        for (id, row) in logical::load_methods(conn)? {
            let parent = resolve_opt(&self.types, "class_declaration", row.class_id)?;
            let method = self.registry.get_or_add_method(MethodDecl {
                qualified_name: &row.qualified_name,
                name: &row.name,
                signature: &row.signature,
                return_type: &row.return_type,
                template_parameters: &row.template_parameters,
                access: AccessSpecifier::from_i64(row.access),
                flags: MethodFlags {
                    is_virtual: row.is_virtual,
                    is_pure: row.is_pure,
                    is_static: row.is_static,
                    is_const: row.is_const,
                },
                parent: parent.as_ref(),
            });
            self.methods.insert(id, method);
        }
        Ok(())
    }

    fn load_edges(&mut self, conn: &Connection) -> Result<(), StorageError> {
        for table in EdgeTable::ALL {
            let name = table.table_name();
            for (source, target) in load_edges(conn, table)? {
                match table {
                    EdgeTable::PackageDependency => {
                        let source = resolve(&self.packages, name, source)?;
                        let target = resolve(&self.packages, name, target)?;
                        PackageObject::add_dependency(&source, &target);
                    }
                    EdgeTable::ComponentDependency => {
                        let source = resolve(&self.components, name, source)?;
                        let target = resolve(&self.components, name, target)?;
                        ComponentObject::add_dependency(&source, &target);
                    }
                    EdgeTable::Include => {
                        let source = resolve(&self.files, name, source)?;
                        let target = resolve(&self.files, name, target)?;
                        FileObject::add_include_relation(&source, &target);
                    }
                    EdgeTable::NamespaceFile => {
                        let file = resolve(&self.files, name, source)?;
                        let namespace = resolve(&self.namespaces, name, target)?;
                        FileObject::add_namespace(&file, &namespace);
                    }
                    EdgeTable::GlobalFunctionFile => {
                        let file = resolve(&self.files, name, source)?;
                        let function = resolve(&self.functions, name, target)?;
                        file.with_rw_lock(|f| f.add_global_function(&function));
                    }
                    EdgeTable::ClassHierarchy => {
                        let derived = resolve(&self.types, name, source)?;
                        let base = resolve(&self.types, name, target)?;
                        TypeObject::add_is_a(&derived, &base);
                    }
                    EdgeTable::UsesInTheInterface => {
                        let source = resolve(&self.types, name, source)?;
                        let target = resolve(&self.types, name, target)?;
                        TypeObject::add_uses_in_the_interface(&source, &target);
                    }
                    EdgeTable::UsesInTheImplementation => {
                        let source = resolve(&self.types, name, source)?;
                        let target = resolve(&self.types, name, target)?;
                        TypeObject::add_uses_in_the_implementation(&source, &target);
                    }
                    EdgeTable::UdtComponent => {
                        let ty = resolve(&self.types, name, source)?;
                        let component = resolve(&self.components, name, target)?;
                        TypeObject::add_component(&ty, &component);
                    }
                    EdgeTable::ClassSourceFile => {
                        let ty = resolve(&self.types, name, source)?;
                        let file = resolve(&self.files, name, target)?;
                        FileObject::add_type(&file, &ty);
                    }
                    EdgeTable::FieldType => {
                        let field = resolve(&self.fields, name, source)?;
                        let ty = resolve(&self.types, name, target)?;
                        field.with_rw_lock(|f| f.add_variable_type(&ty));
                    }
                    EdgeTable::MethodArgumentClass => {
                        let method = resolve(&self.methods, name, source)?;
                        let ty = resolve(&self.types, name, target)?;
                        method.with_rw_lock(|m| m.add_argument_type(&ty));
                    }
                    EdgeTable::FunctionCalls => {
                        let caller = resolve(&self.functions, name, source)?;
                        let callee = resolve(&self.functions, name, target)?;
                        FunctionObject::add_dependency(&caller, &callee);
                    }
                }
            }
        }
        Ok(())
    }
}
