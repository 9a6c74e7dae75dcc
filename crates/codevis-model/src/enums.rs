//! Enumerations shared by the model and the persisted schema.
//! Integer values are stable; they are written to the database as-is.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UdtKind {
    Class = 0,
    Enum = 1,
    Struct = 2,
    TypeAlias = 3,
    Union = 4,
    #[default]
    Unknown = 5,
}

impl UdtKind {
    pub fn from_i64(value: i64) -> Self {
        match value {
            0 => Self::Class,
            1 => Self::Enum,
            2 => Self::Struct,
            3 => Self::TypeAlias,
            4 => Self::Union,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessSpecifier {
    Public = 0,
    Protected = 1,
    Private = 2,
    #[default]
    None = 3,
}

impl AccessSpecifier {
    pub fn from_i64(value: i64) -> Self {
        match value {
            0 => Self::Public,
            1 => Self::Protected,
            2 => Self::Private,
            _ => Self::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorKind {
    #[default]
    CompilerError = 0,
    ParseError = 1,
}

impl ErrorKind {
    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => Self::ParseError,
            _ => Self::CompilerError,
        }
    }
}

/// Relationship kinds as bit flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LakosRelationType {
    IsA = 1,
    PackageDependency = 2,
    UsesInNameOnly = 4,
    UsesInTheImplementation = 8,
    UsesInTheInterface = 16,
}

impl LakosRelationType {
    pub fn label(self) -> &'static str {
        match self {
            Self::IsA => "is-a",
            Self::PackageDependency => "package-dependency",
            Self::UsesInNameOnly => "uses-in-name-only",
            Self::UsesInTheImplementation => "uses-in-the-implementation",
            Self::UsesInTheInterface => "uses-in-the-interface",
        }
    }
}

/// Every lockable entity kind. The declaration order is the first key of the
/// global lock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Repository,
    Package,
    Component,
    File,
    Namespace,
    Type,
    Function,
    Method,
    Field,
    Variable,
    Error,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Repository => "repository",
            Self::Package => "package",
            Self::Component => "component",
            Self::File => "file",
            Self::Namespace => "namespace",
            Self::Type => "type",
            Self::Function => "function",
            Self::Method => "method",
            Self::Field => "field",
            Self::Variable => "variable",
            Self::Error => "error",
        }
    }
}

/// Pipeline progress recorded on the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    Error,
    ManuallyStopped,
    #[default]
    NoneReady,
    PhysicalReady,
    PhysicalError,
    AllReady,
    LogicalError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_values_round_trip() {
        for kind in [UdtKind::Class, UdtKind::Enum, UdtKind::Struct, UdtKind::TypeAlias, UdtKind::Union] {
            assert_eq!(UdtKind::from_i64(kind as i64), kind);
        }
        assert_eq!(UdtKind::from_i64(42), UdtKind::Unknown);
        assert_eq!(AccessSpecifier::from_i64(AccessSpecifier::Protected as i64), AccessSpecifier::Protected);
        assert_eq!(AccessSpecifier::from_i64(-1), AccessSpecifier::None);
        assert_eq!(ErrorKind::from_i64(ErrorKind::ParseError as i64), ErrorKind::ParseError);
    }

    #[test]
    fn relation_types_are_distinct_bits() {
        let all = [
            LakosRelationType::IsA,
            LakosRelationType::PackageDependency,
            LakosRelationType::UsesInNameOnly,
            LakosRelationType::UsesInTheImplementation,
            LakosRelationType::UsesInTheInterface,
        ];
        let mask = all.iter().fold(0, |acc, r| {
            assert_eq!(acc & (*r as i32), 0, "{}", r.label());
            acc | *r as i32
        });
        assert_eq!(mask, 31);
        assert_eq!(LakosRelationType::UsesInTheInterface.label(), "uses-in-the-interface");
    }
}
