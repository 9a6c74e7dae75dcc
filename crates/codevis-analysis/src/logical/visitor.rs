//! Declaration and dependency extraction for one translation unit.
//!
//! Files arrive from the include walker after everything they include, so
//! each file can be processed in two passes: the first registers namespaces,
//! types and free functions, the second records relationships. Names are
//! resolved against the types seen in this translation unit only, which keeps
//! the result independent of how units are scheduled across threads.

use std::path::Path;

use codevis_core::types::collections::FxHashMap;
use codevis_core::Diagnostics;
use codevis_model::store::{FieldDecl, FunctionDecl, MethodDecl, TypeDecl, VariableDecl};
use codevis_model::{
    AccessSpecifier, ComponentRef, ErrorKind, FileObject, FileRef, FunctionRef, MethodFlags, NamespaceRef,
    ObjectStore, PackageRef, TypeObject, TypeRef, UdtKind,
};
use tree_sitter::{Node, Tree};

use super::static_fn::{fn_id, FnId, StaticFnHandler};
use super::syntax::{
    call_sites, declarator_name, function_declarator, is_const_function, is_pure_virtual, is_static, is_virtual,
    parameter_types, referenced_type_names, squash, strip_template_args, CallSite,
};
use crate::constants::ToolConstants;
use crate::parsers::{collect_errors, named_children, node_text, IncludeDirective};
use crate::paths::{categorise_path, file_name, FileType};
use crate::physical::{write_source_file, IncludeVisitor};

const ANONYMOUS_NAMESPACE: &str = "(anonymous namespace)";

/// Counts of what one translation unit produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitStats {
    pub files: usize,
    pub types: usize,
    pub methods: usize,
    pub fields: usize,
    pub functions: usize,
    pub variables: usize,
    pub syntax_errors: usize,
}

#[derive(Debug, Clone)]
struct FreeFunction {
    id: FnId,
    arity: usize,
    variadic: bool,
    entity: Option<FunctionRef>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Pass {
    Declare,
    Relate,
}

#[derive(Clone, Default)]
struct Scope {
    path: Vec<String>,
    namespace: Option<NamespaceRef>,
    class: Option<TypeRef>,
    access: AccessSpecifier,
    anonymous: bool,
    /// Parameter list of an enclosing `template <...>`, for the next declaration only.
    template: String,
}

impl Scope {
    fn qualify(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}::{name}", self.path.join("::"))
        }
    }

    fn nested(&self) -> Self {
        Self {
            template: String::new(),
            ..self.clone()
        }
    }
}

struct FileContext<'s> {
    source: &'s [u8],
    file: FileRef,
    package: Option<PackageRef>,
    component: Option<ComponentRef>,
}

pub struct LogicalVisitor<'a> {
    store: &'a ObjectStore,
    constants: &'a ToolConstants,
    diagnostics: &'a Diagnostics,
    handler: StaticFnHandler,
    types: FxHashMap<String, TypeRef>,
    functions: FxHashMap<String, Vec<FreeFunction>>,
    stats: VisitStats,
}

impl<'a> LogicalVisitor<'a> {
    pub fn new(store: &'a ObjectStore, constants: &'a ToolConstants, diagnostics: &'a Diagnostics) -> Self {
        Self {
            store,
            constants,
            diagnostics,
            handler: StaticFnHandler::new(),
            types: FxHashMap::default(),
            functions: FxHashMap::default(),
            stats: VisitStats::default(),
        }
    }

    pub fn stats(&self) -> VisitStats {
        self.stats
    }

    /// Writes the dependencies routed through free functions. Returns the
    /// number of type edges that produced.
    pub fn finish(&mut self) -> usize {
        let added = self.handler.write_out_to_db();
        self.handler.reset();
        added
    }

    /// Extracts everything declared in one parsed file.
    pub fn visit_file(&mut self, path: &Path, source: &[u8], tree: &Tree) {
        if self.constants.ignore.is_ignored(&file_name(path)) {
            return;
        }
        let is_header = categorise_path(path) == FileType::Header;
        let Some(file) = write_source_file(self.store, self.constants, path, is_header) else {
            return;
        };
        self.stats.files += 1;
        self.record_syntax_errors(&file, tree);

        let (package, component) = {
            let data = file.read();
            (data.package().cloned(), data.component().cloned())
        };
        let ctx = FileContext {
            source,
            file,
            package,
            component,
        };
        let root = tree.root_node();
        self.walk_children(root, Scope::default(), Pass::Declare, &ctx);
        self.walk_children(root, Scope::default(), Pass::Relate, &ctx);
    }

    fn record_syntax_errors(&mut self, file: &FileRef, tree: &Tree) {
        let qualified_name = file.qualified_name();
        for error in collect_errors(tree.root_node()) {
            let message = error.message();
            self.store
                .get_or_add_error(ErrorKind::ParseError, qualified_name, &message, qualified_name);
            self.diagnostics.warn(&format!("{qualified_name}: {message}"));
            self.stats.syntax_errors += 1;
        }
    }

    fn walk_children(&mut self, node: Node<'_>, mut scope: Scope, pass: Pass, ctx: &FileContext<'_>) {
        for child in named_children(node) {
            if child.kind() == "access_specifier" {
                scope.access = parse_access(node_text(child, ctx.source));
                continue;
            }
            self.walk(child, &scope, pass, ctx);
        }
    }

    fn walk(&mut self, node: Node<'_>, scope: &Scope, pass: Pass, ctx: &FileContext<'_>) {
        match node.kind() {
            "namespace_definition" => self.namespace(node, scope, pass, ctx),
            "class_specifier" | "struct_specifier" | "union_specifier" => self.class(node, scope, pass, ctx),
            "enum_specifier" => self.enumeration(node, scope, pass, ctx),
            "alias_declaration" => self.alias(node, scope, pass, ctx),
            "type_definition" => self.typedef(node, scope, pass, ctx),
            "template_declaration" => {
                let mut inner = scope.clone();
                inner.template = node
                    .child_by_field_name("parameters")
                    .map(|p| squash(node_text(p, ctx.source)))
                    .unwrap_or_default();
                for child in named_children(node) {
                    if child.kind() != "template_parameter_list" {
                        self.walk(child, &inner, pass, ctx);
                    }
                }
            }
            "function_definition" => self.function_definition(node, scope, pass, ctx),
            "declaration" => self.declaration(node, scope, pass, ctx),
            "field_declaration" => self.field_declaration(node, scope, pass, ctx),
            "compound_statement" | "friend_declaration" | "preproc_include" => {}
            _ => self.walk_children(node, scope.clone(), pass, ctx),
        }
    }

    fn namespace(&mut self, node: Node<'_>, scope: &Scope, pass: Pass, ctx: &FileContext<'_>) {
        let mut inner = scope.nested();
        match node.child_by_field_name("name") {
            None => {
                inner.path.push(ANONYMOUS_NAMESPACE.to_string());
                inner.anonymous = true;
            }
            Some(name) => {
                let text = node_text(name, ctx.source);
                for segment in text.split("::").map(|s| s.trim().trim_start_matches("inline ").trim()) {
                    if segment.is_empty() {
                        continue;
                    }
                    let qualified_name = inner.qualify(segment);
                    let namespace = self
                        .store
                        .get_or_add_namespace(&qualified_name, segment, inner.namespace.as_ref());
                    if pass == Pass::Declare {
                        FileObject::add_namespace(&ctx.file, &namespace);
                    }
                    inner.namespace = Some(namespace);
                    inner.path.push(segment.to_string());
                }
            }
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.walk_children(body, inner, pass, ctx);
        }
    }

    fn register_type(&mut self, name: &str, kind: UdtKind, scope: &Scope, ctx: &FileContext<'_>) -> TypeRef {
        let qualified_name = scope.qualify(name);
        if let Some(existing) = self.types.get(&qualified_name) {
            FileObject::add_type(&ctx.file, existing);
            return existing.clone();
        }
        let access = if scope.class.is_some() {
            scope.access
        } else {
            AccessSpecifier::None
        };
        let simple = name.rsplit("::").next().unwrap_or(name);
        let ty = self.store.get_or_add_type(TypeDecl {
            qualified_name: &qualified_name,
            name: simple,
            kind,
            access,
            namespace: scope.namespace.as_ref(),
            package: ctx.package.as_ref(),
            parent: scope.class.as_ref(),
        });
        FileObject::add_type(&ctx.file, &ty);
        if let Some(component) = &ctx.component {
            TypeObject::add_component(&ty, component);
        }
        self.types.insert(qualified_name, ty.clone());
        self.stats.types += 1;
        self.diagnostics
            .debug(|| format!("type {} in {}", ty.qualified_name(), ctx.file.qualified_name()));
        ty
    }

    fn class(&mut self, node: Node<'_>, scope: &Scope, pass: Pass, ctx: &FileContext<'_>) {
        // Forward declarations and anonymous records are not types of their own.
        let (Some(name_node), Some(body)) = (node.child_by_field_name("name"), node.child_by_field_name("body")) else {
            return;
        };
        let name = squash(node_text(name_node, ctx.source));
        let (kind, default_access) = match node.kind() {
            "struct_specifier" => (UdtKind::Struct, AccessSpecifier::Public),
            "union_specifier" => (UdtKind::Union, AccessSpecifier::Public),
            _ => (UdtKind::Class, AccessSpecifier::Private),
        };

        let ty = match pass {
            Pass::Declare => self.register_type(&name, kind, scope, ctx),
            Pass::Relate => {
                let Some(ty) = self.types.get(&scope.qualify(&name)).cloned() else {
                    return;
                };
                self.base_classes(node, &ty, scope, ctx);
                ty
            }
        };

        let mut inner = scope.nested();
        inner.path.extend(name.split("::").map(str::to_string));
        inner.class = Some(ty);
        inner.access = default_access;
        self.walk_children(body, inner, pass, ctx);
    }

    fn base_classes(&mut self, node: Node<'_>, ty: &TypeRef, scope: &Scope, ctx: &FileContext<'_>) {
        for clause in named_children(node).into_iter().filter(|c| c.kind() == "base_class_clause") {
            for base in named_children(clause) {
                let (name, arguments) = match base.kind() {
                    "type_identifier" | "qualified_identifier" => (node_text(base, ctx.source), None),
                    "template_type" => (
                        base.child_by_field_name("name")
                            .map_or("", |n| node_text(n, ctx.source)),
                        base.child_by_field_name("arguments"),
                    ),
                    _ => continue,
                };
                if let Some(base_ty) = self.resolve_type(strip_template_args(name), scope) {
                    TypeObject::add_is_a(ty, &base_ty);
                }
                if let Some(arguments) = arguments {
                    for argument in self.resolve_all(referenced_type_names(arguments, ctx.source), scope) {
                        TypeObject::add_uses_in_the_interface(ty, &argument);
                    }
                }
            }
        }
    }

    fn enumeration(&mut self, node: Node<'_>, scope: &Scope, pass: Pass, ctx: &FileContext<'_>) {
        if pass != Pass::Declare || node.child_by_field_name("body").is_none() {
            return;
        }
        if let Some(name) = node.child_by_field_name("name") {
            let name = squash(node_text(name, ctx.source));
            self.register_type(&name, UdtKind::Enum, scope, ctx);
        }
    }

    fn alias(&mut self, node: Node<'_>, scope: &Scope, pass: Pass, ctx: &FileContext<'_>) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let name = node_text(name, ctx.source).to_string();
        self.register_alias(&name, node.child_by_field_name("type"), scope, pass, ctx);
    }

    fn typedef(&mut self, node: Node<'_>, scope: &Scope, pass: Pass, ctx: &FileContext<'_>) {
        let target = node.child_by_field_name("type");
        if let Some(target) = target {
            self.walk(target, scope, pass, ctx);
        }
        let mut cursor = node.walk();
        let names: Vec<String> = node
            .children_by_field_name("declarator", &mut cursor)
            .filter(|d| d.kind() == "type_identifier")
            .map(|d| node_text(d, ctx.source).to_string())
            .collect();
        for name in names {
            self.register_alias(&name, target, scope, pass, ctx);
        }
    }

    fn register_alias(&mut self, name: &str, target: Option<Node<'_>>, scope: &Scope, pass: Pass, ctx: &FileContext<'_>) {
        match pass {
            Pass::Declare => {
                self.register_type(name, UdtKind::TypeAlias, scope, ctx);
            }
            Pass::Relate => {
                let Some(alias) = self.types.get(&scope.qualify(name)).cloned() else {
                    return;
                };
                if let Some(target) = target {
                    for used in self.resolve_all(referenced_type_names(target, ctx.source), scope) {
                        TypeObject::add_uses_in_the_implementation(&alias, &used);
                    }
                }
                if let Some(parent) = &scope.class {
                    relate_by_access(parent, &alias, scope.access);
                }
            }
        }
    }

    fn function_definition(&mut self, node: Node<'_>, scope: &Scope, pass: Pass, ctx: &FileContext<'_>) {
        let Some((declarator, decorations)) = node.child_by_field_name("declarator").and_then(function_declarator)
        else {
            return;
        };
        let Some(name_node) = declarator.child_by_field_name("declarator") else {
            return;
        };
        let body = node.child_by_field_name("body");
        let return_type = return_type(node, &decorations, ctx.source);

        if let Some(class) = scope.class.clone() {
            if pass == Pass::Relate {
                let access = scope.access;
                self.method(node, declarator, name_node, &class, access, &return_type, body, scope, ctx);
            }
            return;
        }

        if name_node.kind() == "qualified_identifier" {
            if let Some(owner) = name_node
                .child_by_field_name("scope")
                .and_then(|s| self.resolve_type(strip_template_args(node_text(s, ctx.source)), scope))
            {
                if pass == Pass::Relate {
                    let mut inner = scope.clone();
                    inner.path = owner.qualified_name().split("::").map(str::to_string).collect();
                    self.method(node, declarator, name_node, &owner, AccessSpecifier::None, &return_type, body, &inner, ctx);
                }
                return;
            }
        }

        self.free_function(node, declarator, name_node, &return_type, body, scope, pass, ctx);
    }

    #[allow(clippy::too_many_arguments)]
    fn method(
        &mut self,
        node: Node<'_>,
        declarator: Node<'_>,
        name_node: Node<'_>,
        class: &TypeRef,
        access: AccessSpecifier,
        return_type: &str,
        body: Option<Node<'_>>,
        scope: &Scope,
        ctx: &FileContext<'_>,
    ) {
        let source = ctx.source;
        let full_name = squash(node_text(name_node, source));
        let name = full_name.rsplit("::").next().unwrap_or(&full_name).to_string();
        let qualified_name = format!("{}::{name}", class.qualified_name());
        let parameters = parameter_types(declarator, source);
        let is_const = is_const_function(declarator, source);
        let mut signature = format!("{name}({})", parameters.join(", "));
        if is_const {
            signature.push_str(" const");
        }
        let flags = MethodFlags {
            is_virtual: is_virtual(node, declarator),
            is_pure: is_pure_virtual(node, source),
            is_static: is_static(node, source),
            is_const,
        };

        // Out-of-line definitions keep the access of the in-class declaration.
        let existing = self
            .store
            .with_ro_lock(|r| r.method(&qualified_name, &signature, &scope.template, return_type));
        let access = match (&existing, access) {
            (Some(method), AccessSpecifier::None) => method.read().access,
            _ => access,
        };
        let method = match existing {
            Some(method) => method,
            None => {
                self.stats.methods += 1;
                self.store.get_or_add_method(MethodDecl {
                    qualified_name: &qualified_name,
                    name: &name,
                    signature: &signature,
                    return_type,
                    template_parameters: &scope.template,
                    access,
                    flags,
                    parent: Some(class),
                })
            }
        };

        let mut interface_names = Vec::new();
        if let Some(parameters) = declarator.child_by_field_name("parameters") {
            interface_names.extend(referenced_type_names(parameters, source));
        }
        if let Some(ret) = node.child_by_field_name("type") {
            interface_names.extend(referenced_type_names(ret, source));
        }
        for used in self.resolve_all(interface_names, scope) {
            method.with_rw_lock(|m| m.add_argument_type(&used));
            relate_by_access(class, &used, access);
        }

        let Some(body) = body else {
            return;
        };
        for used in self.resolve_all(referenced_type_names(body, source), scope) {
            TypeObject::add_uses_in_the_implementation(class, &used);
        }
        for call in call_sites(body, source) {
            for callee in self.resolve_functions(&call, scope) {
                self.handler.add_udt_uses(class, callee.id);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn free_function(
        &mut self,
        node: Node<'_>,
        declarator: Node<'_>,
        name_node: Node<'_>,
        return_type: &str,
        body: Option<Node<'_>>,
        scope: &Scope,
        pass: Pass,
        ctx: &FileContext<'_>,
    ) {
        let source = ctx.source;
        let spelled = squash(node_text(name_node, source));
        let qualified_name = scope.qualify(&spelled);
        let name = spelled.rsplit("::").next().unwrap_or(&spelled).to_string();
        let parameters = parameter_types(declarator, source);
        let id = fn_id(&scope.template, &qualified_name, &parameters);

        match pass {
            Pass::Declare => {
                let entity = match body {
                    Some(_) if !scope.anonymous && !is_static(node, source) => {
                        let signature = format!("{name}({})", parameters.join(", "));
                        let function = self.store.get_or_add_function(FunctionDecl {
                            qualified_name: &qualified_name,
                            name: &name,
                            signature: &signature,
                            return_type,
                            template_parameters: &scope.template,
                            namespace: scope.namespace.as_ref(),
                        });
                        ctx.file.with_rw_lock(|f| f.add_global_function(&function));
                        self.stats.functions += 1;
                        Some(function)
                    }
                    _ => None,
                };
                let variadic = parameters.last().is_some_and(|p| p == "...");
                let overloads = self.functions.entry(qualified_name).or_default();
                match overloads.iter_mut().find(|f| f.id == id) {
                    Some(known) => {
                        if known.entity.is_none() {
                            known.entity = entity;
                        }
                    }
                    None => overloads.push(FreeFunction {
                        id,
                        arity: parameters.len() - usize::from(variadic),
                        variadic,
                        entity,
                    }),
                }
            }
            Pass::Relate => {
                let Some(body) = body else {
                    return;
                };
                let entity = self
                    .functions
                    .get(&qualified_name)
                    .and_then(|overloads| overloads.iter().find(|f| f.id == id))
                    .and_then(|f| f.entity.clone());

                // Names inside `ns::f` resolve as if written inside `ns`.
                let mut inner = scope.clone();
                inner
                    .path
                    .extend(spelled.split("::").map(str::to_string).take(spelled.matches("::").count()));

                let mut names = referenced_type_names(body, source);
                if let Some(parameters) = declarator.child_by_field_name("parameters") {
                    names.extend(referenced_type_names(parameters, source));
                }
                if let Some(ret) = node.child_by_field_name("type") {
                    names.extend(referenced_type_names(ret, source));
                }
                for used in self.resolve_all(names, &inner) {
                    self.handler.add_fn_uses_udt(id, &used);
                }
                for call in call_sites(body, source) {
                    for callee in self.resolve_functions(&call, &inner) {
                        self.handler.add_fn_uses_fn(id, callee.id);
                        self.handler.add_callgraph_dep(entity.as_ref(), callee.entity.as_ref());
                    }
                }
            }
        }
    }

    fn declaration(&mut self, node: Node<'_>, scope: &Scope, pass: Pass, ctx: &FileContext<'_>) {
        let source = ctx.source;
        let type_node = node.child_by_field_name("type");
        if let Some(type_node) = type_node {
            if type_node.child_by_field_name("body").is_some() {
                self.walk(type_node, scope, pass, ctx);
            }
        }

        let mut cursor = node.walk();
        let declarators: Vec<Node<'_>> = node.children_by_field_name("declarator", &mut cursor).collect();
        for declarator in declarators {
            if let Some((function, decorations)) = function_declarator(declarator) {
                let Some(name_node) = function.child_by_field_name("declarator") else {
                    continue;
                };
                let return_type = return_type(node, &decorations, source);
                match &scope.class {
                    Some(class) if pass == Pass::Relate => {
                        let class = class.clone();
                        self.method(node, function, name_node, &class, scope.access, &return_type, None, scope, ctx);
                    }
                    Some(_) => {}
                    None => self.free_function(node, function, name_node, &return_type, None, scope, pass, ctx),
                }
                continue;
            }

            if pass != Pass::Declare || scope.class.is_some() {
                continue;
            }
            let Some(name_node) = declarator_name(declarator) else {
                continue;
            };
            if name_node.kind() == "qualified_identifier" {
                // Out-of-line static member definition.
                continue;
            }
            let name = node_text(name_node, source);
            let qualified_name = scope.qualify(name);
            let signature = squash(&format!(
                "{} {}",
                type_node.map_or("", |t| node_text(t, source)),
                node_text(declarator, source)
            ));
            self.store.get_or_add_variable(VariableDecl {
                qualified_name: &qualified_name,
                name,
                signature: &signature,
                is_global: !scope.anonymous && !is_static(node, source),
                namespace: scope.namespace.as_ref(),
            });
            self.stats.variables += 1;
        }
    }

    fn field_declaration(&mut self, node: Node<'_>, scope: &Scope, pass: Pass, ctx: &FileContext<'_>) {
        let source = ctx.source;
        let type_node = node.child_by_field_name("type");
        if let Some(type_node) = type_node {
            if type_node.child_by_field_name("body").is_some() {
                self.walk(type_node, scope, pass, ctx);
            }
        }
        let Some(class) = scope.class.clone() else {
            return;
        };
        if pass != Pass::Relate {
            return;
        }

        let mut cursor = node.walk();
        let declarators: Vec<Node<'_>> = node.children_by_field_name("declarator", &mut cursor).collect();
        for declarator in declarators {
            if let Some((function, decorations)) = function_declarator(declarator) {
                if let Some(name_node) = function.child_by_field_name("declarator") {
                    let return_type = return_type(node, &decorations, source);
                    self.method(node, function, name_node, &class, scope.access, &return_type, None, scope, ctx);
                }
                continue;
            }

            let Some(name_node) = declarator_name(declarator) else {
                continue;
            };
            let name = node_text(name_node, source);
            let qualified_name = format!("{}::{name}", class.qualified_name());
            let signature = squash(&format!(
                "{} {}",
                type_node.map_or("", |t| node_text(t, source)),
                node_text(declarator, source)
            ));
            let field = self.store.get_or_add_field(FieldDecl {
                qualified_name: &qualified_name,
                name,
                signature: &signature,
                access: scope.access,
                is_static: is_static(node, source),
                parent: Some(&class),
            });
            self.stats.fields += 1;

            let Some(type_node) = type_node else {
                continue;
            };
            for used in self.resolve_all(referenced_type_names(type_node, source), scope) {
                field.with_rw_lock(|f| f.add_variable_type(&used));
                relate_by_access(&class, &used, scope.access);
            }
        }
    }

    /// Looks `name` up from the innermost enclosing scope outwards.
    fn resolve_type(&self, name: &str, scope: &Scope) -> Option<TypeRef> {
        let name = name.trim_start_matches("::");
        if name.is_empty() {
            return None;
        }
        (0..=scope.path.len()).rev().find_map(|depth| {
            let candidate = if depth == 0 {
                name.to_string()
            } else {
                format!("{}::{name}", scope.path[..depth].join("::"))
            };
            self.types.get(&candidate).cloned()
        })
    }

    fn resolve_all(&self, names: Vec<String>, scope: &Scope) -> Vec<TypeRef> {
        let mut out: Vec<TypeRef> = Vec::new();
        for name in names {
            if let Some(ty) = self.resolve_type(&name, scope) {
                if !out.iter().any(|t| std::sync::Arc::ptr_eq(t, &ty)) {
                    out.push(ty);
                }
            }
        }
        out
    }

    /// Overloads of the called name with a matching argument count, or all
    /// overloads when none match.
    fn resolve_functions(&self, call: &CallSite, scope: &Scope) -> Vec<FreeFunction> {
        let name = call.name.trim_start_matches("::");
        let overloads = (0..=scope.path.len()).rev().find_map(|depth| {
            let candidate = if depth == 0 {
                name.to_string()
            } else {
                format!("{}::{name}", scope.path[..depth].join("::"))
            };
            self.functions.get(&candidate)
        });
        let Some(overloads) = overloads else {
            return Vec::new();
        };
        let matching: Vec<FreeFunction> = overloads
            .iter()
            .filter(|f| f.arity == call.arguments || (f.variadic && call.arguments >= f.arity))
            .cloned()
            .collect();
        if matching.is_empty() {
            overloads.clone()
        } else {
            matching
        }
    }
}

impl IncludeVisitor for LogicalVisitor<'_> {
    fn file_changed(&mut self, _path: &Path) {}

    fn inclusion_directive(&mut self, _directive: &IncludeDirective, _resolved: &Path) {}

    fn file_parsed(&mut self, path: &Path, source: &[u8], tree: &Tree) {
        self.visit_file(path, source, tree);
    }
}

fn parse_access(text: &str) -> AccessSpecifier {
    match text.trim().trim_end_matches(':').trim() {
        "public" => AccessSpecifier::Public,
        "protected" => AccessSpecifier::Protected,
        "private" => AccessSpecifier::Private,
        _ => AccessSpecifier::None,
    }
}

/// Public and protected uses are part of the interface, private ones of the
/// implementation.
fn relate_by_access(source: &TypeRef, target: &TypeRef, access: AccessSpecifier) {
    match access {
        AccessSpecifier::Public | AccessSpecifier::Protected => {
            TypeObject::add_uses_in_the_interface(source, target);
        }
        AccessSpecifier::Private => {
            TypeObject::add_uses_in_the_implementation(source, target);
        }
        AccessSpecifier::None => {}
    }
}

fn return_type(node: Node<'_>, decorations: &str, source: &[u8]) -> String {
    let base = node
        .child_by_field_name("type")
        .map(|t| squash(node_text(t, source)))
        .unwrap_or_default();
    format!("{base}{decorations}")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use codevis_model::{ObjectStore, TypeRef, UdtKind};

    use super::*;
    use crate::parsers::parse_source;
    use crate::paths::IgnoreGlobs;

    const PATH: &str = "/src/groups/abc/abcx/abcx_thing.cpp";

    fn visit_with(code: &str, constants: &ToolConstants) -> (ObjectStore, Diagnostics) {
        let store = ObjectStore::new();
        let diagnostics = Diagnostics::new();
        let path = Path::new(PATH);
        let tree = parse_source(path, code.as_bytes()).unwrap();
        let mut visitor = LogicalVisitor::new(&store, constants, &diagnostics);
        visitor.visit_file(path, code.as_bytes(), &tree);
        visitor.finish();
        (store, diagnostics)
    }

    fn visit(code: &str) -> ObjectStore {
        visit_with(code, &ToolConstants::new("/src")).0
    }

    fn names(types: &[TypeRef]) -> Vec<String> {
        types.iter().map(|t| t.qualified_name().to_string()).collect()
    }

    #[test]
    fn access_decides_interface_or_implementation() {
        let store = visit(
            r#"
            namespace abc {
            class Dep {};
            class Impl {};
            class Base {};
            class Thing : public Base {
              public:
                Dep make(int count) const;
              private:
                Impl d_impl;
            };
            }
            "#,
        );
        let thing = store.type_("abc::Thing").unwrap();
        let data = thing.read();
        assert_eq!(data.kind, UdtKind::Class);
        assert_eq!(data.namespace().unwrap().qualified_name(), "abc");
        assert_eq!(names(data.superclasses()), vec!["abc::Base"]);
        assert_eq!(names(data.uses_in_the_interface()), vec!["abc::Dep"]);
        assert_eq!(names(data.uses_in_the_implementation()), vec!["abc::Impl"]);
        assert_eq!(data.components()[0].qualified_name(), "groups/abc/abcx/abcx_thing");

        let registry = store.read();
        let method = registry.methods().values().next().unwrap().clone();
        assert_eq!(method.qualified_name(), "abc::Thing::make");
        assert_eq!(method.read().signature, "make(int) const");
        assert!(method.read().flags.is_const);
        assert_eq!(names(method.read().argument_types()), vec!["abc::Dep"]);
        let field = registry.field("abc::Thing::d_impl").unwrap();
        assert_eq!(names(field.read().variable_types()), vec!["abc::Impl"]);
    }

    #[test]
    fn static_function_dependencies_reach_the_calling_type() {
        let store = visit(
            r#"
            class TypeB {};
            static void helper() { TypeB b; }
            class TypeA {
              public:
                void run() { helper(); }
            };
            "#,
        );
        let a = store.type_("TypeA").unwrap();
        assert_eq!(names(a.read().uses_in_the_implementation()), vec!["TypeB"]);
        assert!(store.read().functions().is_empty());
    }

    #[test]
    fn global_functions_get_call_edges() {
        let store = visit(
            r#"
            void callee() {}
            void caller() { callee(); }
            "#,
        );
        let registry = store.read();
        let caller = registry.function("caller", "caller()", "", "void").unwrap();
        let callee = registry.function("callee", "callee()", "", "void").unwrap();
        assert_eq!(caller.read().callees().len(), 1);
        assert!(std::sync::Arc::ptr_eq(&caller.read().callees()[0], &callee));
        let file = registry.file("groups/abc/abcx/abcx_thing.cpp").unwrap();
        assert_eq!(file.read().global_functions().len(), 2);
    }

    #[test]
    fn anonymous_namespace_functions_are_not_global() {
        let store = visit("namespace { void hidden() {} }\nint counter = 0;\n");
        let registry = store.read();
        assert!(registry.functions().is_empty());
        assert!(registry.variable("counter").unwrap().read().is_global);
    }

    #[test]
    fn aliases_use_their_target() {
        let store = visit(
            r#"
            class Target {};
            class Holder {
              public:
                using Alias = Target;
            };
            typedef Target Other;
            "#,
        );
        let alias = store.type_("Holder::Alias").unwrap();
        assert_eq!(alias.read().kind, UdtKind::TypeAlias);
        assert_eq!(names(alias.read().uses_in_the_implementation()), vec!["Target"]);
        let holder = store.type_("Holder").unwrap();
        assert_eq!(names(holder.read().uses_in_the_interface()), vec!["Holder::Alias"]);
        assert_eq!(names(store.type_("Other").unwrap().read().uses_in_the_implementation()), vec!["Target"]);
    }

    #[test]
    fn out_of_line_definitions_attach_to_their_class() {
        let store = visit(
            r#"
            class Used {};
            class Widget {
                void go();
            };
            void Widget::go() { Used u; }
            "#,
        );
        let widget = store.type_("Widget").unwrap();
        assert_eq!(names(widget.read().uses_in_the_implementation()), vec!["Used"]);
        assert_eq!(store.read().methods().len(), 1);
        assert!(store.read().functions().is_empty());
    }

    #[test]
    fn c_style_variadic_overloads_are_distinct_functions() {
        let store = visit("int f(int a) { return a; }\nint f(int a, ...) { return a; }\n");
        let mut signatures: Vec<String> = store
            .read()
            .functions()
            .values()
            .map(|f| f.read().signature.clone())
            .collect();
        signatures.sort();
        assert_eq!(signatures, vec!["f(int)", "f(int, ...)"]);
    }

    #[test]
    fn syntax_errors_are_recorded_and_counted() {
        let (store, diagnostics) = visit_with("class Broken { int x; \n", &ToolConstants::new("/src"));
        assert!(!store.read().errors().is_empty());
        assert!(diagnostics.warning_count() > 0);
    }

    #[test]
    fn ignored_files_are_skipped() {
        let constants = ToolConstants::new("/src").with_ignore(IgnoreGlobs::new(&["*.cpp"]).unwrap());
        let (store, _) = visit_with("class Skipped {};", &constants);
        assert!(store.read().is_empty());
    }
}
