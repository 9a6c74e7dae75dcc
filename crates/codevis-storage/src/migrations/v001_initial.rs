//! V001: physical and logical entity tables, one join table per relationship.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS db_option (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
) STRICT;

CREATE TABLE IF NOT EXISTS source_repository (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL DEFAULT 0,
    name TEXT NOT NULL,
    qualified_name TEXT NOT NULL UNIQUE,
    disk_path TEXT NOT NULL
) STRICT;

-- parent_id is NULL for top-level packages and package groups.
CREATE TABLE IF NOT EXISTS source_package (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL DEFAULT 0,
    parent_id INTEGER REFERENCES source_package(id),
    source_repository_id INTEGER REFERENCES source_repository(id),
    name TEXT NOT NULL,
    qualified_name TEXT NOT NULL UNIQUE,
    disk_path TEXT NOT NULL
) STRICT;

CREATE TABLE IF NOT EXISTS source_component (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL DEFAULT 0,
    qualified_name TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    package_id INTEGER REFERENCES source_package(id)
) STRICT;

CREATE TABLE IF NOT EXISTS source_file (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL DEFAULT 0,
    package_id INTEGER REFERENCES source_package(id),
    component_id INTEGER REFERENCES source_component(id),
    name TEXT NOT NULL,
    qualified_name TEXT NOT NULL UNIQUE,
    is_header INTEGER NOT NULL,
    hash TEXT NOT NULL
) STRICT;

CREATE TABLE IF NOT EXISTS error_messages (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL DEFAULT 0,
    error_kind INTEGER NOT NULL,
    fully_qualified_name TEXT NOT NULL,
    error_message TEXT NOT NULL,
    file_name TEXT NOT NULL,
    UNIQUE(fully_qualified_name, error_message, file_name)
) STRICT;

CREATE TABLE IF NOT EXISTS namespace_declaration (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL DEFAULT 0,
    parent_id INTEGER REFERENCES namespace_declaration(id),
    name TEXT NOT NULL,
    qualified_name TEXT NOT NULL UNIQUE
) STRICT;

CREATE TABLE IF NOT EXISTS variable_declaration (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL DEFAULT 0,
    namespace_id INTEGER REFERENCES namespace_declaration(id),
    name TEXT NOT NULL,
    qualified_name TEXT NOT NULL UNIQUE,
    signature TEXT NOT NULL,
    is_global INTEGER NOT NULL
) STRICT;

-- Overloads and specializations share a qualified name.
CREATE TABLE IF NOT EXISTS function_declaration (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL DEFAULT 0,
    namespace_id INTEGER REFERENCES namespace_declaration(id),
    name TEXT NOT NULL,
    qualified_name TEXT NOT NULL,
    signature TEXT NOT NULL,
    return_type TEXT NOT NULL,
    template_parameters TEXT NOT NULL,
    UNIQUE(qualified_name, signature, template_parameters, return_type)
) STRICT;

-- class_namespace_id is the enclosing class of a nested type.
CREATE TABLE IF NOT EXISTS class_declaration (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL DEFAULT 0,
    parent_namespace_id INTEGER REFERENCES namespace_declaration(id),
    class_namespace_id INTEGER REFERENCES class_declaration(id),
    parent_package_id INTEGER REFERENCES source_package(id),
    name TEXT NOT NULL,
    qualified_name TEXT NOT NULL UNIQUE,
    kind INTEGER NOT NULL,
    access INTEGER NOT NULL
) STRICT;

CREATE TABLE IF NOT EXISTS field_declaration (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL DEFAULT 0,
    class_id INTEGER REFERENCES class_declaration(id),
    name TEXT NOT NULL,
    qualified_name TEXT NOT NULL UNIQUE,
    signature TEXT NOT NULL,
    access INTEGER NOT NULL,
    is_static INTEGER NOT NULL
) STRICT;

CREATE TABLE IF NOT EXISTS method_declaration (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL DEFAULT 0,
    class_id INTEGER REFERENCES class_declaration(id),
    name TEXT NOT NULL,
    qualified_name TEXT NOT NULL,
    signature TEXT NOT NULL,
    return_type TEXT NOT NULL,
    template_parameters TEXT NOT NULL,
    access INTEGER NOT NULL,
    is_virtual INTEGER NOT NULL,
    is_pure INTEGER NOT NULL,
    is_static INTEGER NOT NULL,
    is_const INTEGER NOT NULL,
    UNIQUE(qualified_name, signature, template_parameters, return_type)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_method_class ON method_declaration(class_id);
CREATE INDEX IF NOT EXISTS idx_field_class ON field_declaration(class_id);
CREATE INDEX IF NOT EXISTS idx_file_component ON source_file(component_id);

-- Relationship tables. The composite primary key makes every edge unique.
CREATE TABLE IF NOT EXISTS dependencies (
    source_id INTEGER NOT NULL REFERENCES source_package(id),
    target_id INTEGER NOT NULL REFERENCES source_package(id),
    PRIMARY KEY (source_id, target_id)
) STRICT, WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS component_relation (
    source_id INTEGER NOT NULL REFERENCES source_component(id),
    target_id INTEGER NOT NULL REFERENCES source_component(id),
    PRIMARY KEY (source_id, target_id)
) STRICT, WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS includes (
    source_id INTEGER NOT NULL REFERENCES source_file(id),
    target_id INTEGER NOT NULL REFERENCES source_file(id),
    PRIMARY KEY (source_id, target_id)
) STRICT, WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS namespace_source_file (
    source_file_id INTEGER NOT NULL REFERENCES source_file(id),
    namespace_id INTEGER NOT NULL REFERENCES namespace_declaration(id),
    PRIMARY KEY (source_file_id, namespace_id)
) STRICT, WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS global_function_source_file (
    source_file_id INTEGER NOT NULL REFERENCES source_file(id),
    function_id INTEGER NOT NULL REFERENCES function_declaration(id),
    PRIMARY KEY (source_file_id, function_id)
) STRICT, WITHOUT ROWID;

-- source_id is the derived class, target_id the base.
CREATE TABLE IF NOT EXISTS class_hierarchy (
    source_id INTEGER NOT NULL REFERENCES class_declaration(id),
    target_id INTEGER NOT NULL REFERENCES class_declaration(id),
    PRIMARY KEY (source_id, target_id)
) STRICT, WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS uses_in_the_interface (
    source_id INTEGER NOT NULL REFERENCES class_declaration(id),
    target_id INTEGER NOT NULL REFERENCES class_declaration(id),
    PRIMARY KEY (source_id, target_id)
) STRICT, WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS uses_in_the_implementation (
    source_id INTEGER NOT NULL REFERENCES class_declaration(id),
    target_id INTEGER NOT NULL REFERENCES class_declaration(id),
    PRIMARY KEY (source_id, target_id)
) STRICT, WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS udt_component (
    udt_id INTEGER NOT NULL REFERENCES class_declaration(id),
    component_id INTEGER NOT NULL REFERENCES source_component(id),
    PRIMARY KEY (udt_id, component_id)
) STRICT, WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS class_source_file (
    class_id INTEGER NOT NULL REFERENCES class_declaration(id),
    source_file_id INTEGER NOT NULL REFERENCES source_file(id),
    PRIMARY KEY (class_id, source_file_id)
) STRICT, WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS field_type (
    field_id INTEGER NOT NULL REFERENCES field_declaration(id),
    type_class_id INTEGER NOT NULL REFERENCES class_declaration(id),
    PRIMARY KEY (field_id, type_class_id)
) STRICT, WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS method_argument_class (
    method_id INTEGER NOT NULL REFERENCES method_declaration(id),
    type_class_id INTEGER NOT NULL REFERENCES class_declaration(id),
    PRIMARY KEY (method_id, type_class_id)
) STRICT, WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS function_calls (
    caller_id INTEGER NOT NULL REFERENCES function_declaration(id),
    callee_id INTEGER NOT NULL REFERENCES function_declaration(id),
    PRIMARY KEY (caller_id, callee_id)
) STRICT, WITHOUT ROWID;
"#;
