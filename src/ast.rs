//! Abstract Syntax Tree for IDL translation units.
//!
//! The AST is a tree of owning edges: every node is owned by exactly one
//! parent, and the whole tree hangs off a [`TranslationUnit`]. Node variants
//! form a closed set, so traversal is plain pattern matching; there is no
//! open visitor hierarchy. Nodes carry the logical [`SourceLocation`] of the
//! token that introduced them, for diagnostics.
//!
//! Scoped type references are stored as name paths and resolved lazily at
//! generation time, which is what lets an interface mention a
//! forward-declared type without the tree ever containing a cycle.

use crate::span::SourceLocation;

/// A parsed IDL file: the filename and its top-level definitions in source
/// order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslationUnit {
    pub filename: String,
    pub definitions: Vec<Definition>,
}

/// Any definition that can appear at module scope.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Module(ModuleNode),
    Interface(InterfaceNode),
    Struct(StructNode),
    Union(UnionNode),
    Enum(EnumNode),
    Typedef(TypedefNode),
    Const(ConstNode),
    Exception(ExceptionNode),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Module(n) => &n.name,
            Definition::Interface(n) => &n.name,
            Definition::Struct(n) => &n.name,
            Definition::Union(n) => &n.name,
            Definition::Enum(n) => &n.name,
            Definition::Typedef(n) => n
                .declarators
                .first()
                .map(|d| d.name.as_str())
                .unwrap_or(""),
            Definition::Const(n) => &n.name,
            Definition::Exception(n) => &n.name,
        }
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            Definition::Module(n) => &n.location,
            Definition::Interface(n) => &n.location,
            Definition::Struct(n) => &n.location,
            Definition::Union(n) => &n.location,
            Definition::Enum(n) => &n.location,
            Definition::Typedef(n) => &n.location,
            Definition::Const(n) => &n.location,
            Definition::Exception(n) => &n.location,
        }
    }
}

/// `module X { ... };`
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleNode {
    pub name: String,
    pub definitions: Vec<Definition>,
    pub location: SourceLocation,
}

/// `interface X : A, ::B::C { ... };` or the forward form `interface X;`.
///
/// Base interface names keep their source qualification (absolute names
/// retain the leading `::`).
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceNode {
    pub name: String,
    pub bases: Vec<String>,
    pub contents: Vec<InterfaceMember>,
    pub is_abstract: bool,
    pub is_local: bool,
    pub is_forward: bool,
    pub location: SourceLocation,
}

/// A member of an interface body.
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceMember {
    Operation(OperationNode),
    Attribute(AttributeNode),
    Nested(Definition),
}

/// `struct X { ... };` or the forward form `struct X;`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructNode {
    pub name: String,
    pub members: Vec<StructMember>,
    pub is_forward: bool,
    pub location: SourceLocation,
}

/// A single typed member of a struct or exception.
#[derive(Debug, Clone, PartialEq)]
pub struct StructMember {
    pub ty: TypeNode,
    pub name: String,
    pub location: SourceLocation,
}

/// `union X switch (D) { ... };`
#[derive(Debug, Clone, PartialEq)]
pub struct UnionNode {
    pub name: String,
    pub discriminator: TypeNode,
    pub cases: Vec<UnionCase>,
    pub location: SourceLocation,
}

/// One arm of a union: its labels, member type and member name.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionCase {
    pub labels: Vec<CaseLabel>,
    pub ty: TypeNode,
    pub name: String,
    pub location: SourceLocation,
}

/// A union case label: `case <const-expr>:` or `default:`.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseLabel {
    Value(ConstValue),
    Default,
}

/// `enum X { A, B, C };`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumNode {
    pub name: String,
    pub enumerators: Vec<String>,
    pub location: SourceLocation,
}

/// `typedef T X;` with one or more declarators, each optionally carrying
/// fixed array dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedefNode {
    pub source: TypeNode,
    pub declarators: Vec<TypedefDeclarator>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedefDeclarator {
    pub name: String,
    pub array_dimensions: Vec<u64>,
}

/// `const T X = <const-expr>;` with the folded value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstNode {
    pub name: String,
    pub ty: TypeNode,
    pub value: ConstValue,
    pub location: SourceLocation,
}

/// `exception X { ... };`
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionNode {
    pub name: String,
    pub members: Vec<StructMember>,
    pub location: SourceLocation,
}

/// An operation declared in an interface body.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationNode {
    pub name: String,
    pub return_type: TypeNode,
    pub parameters: Vec<ParameterNode>,
    pub raises: Vec<String>,
    pub is_oneway: bool,
    pub location: SourceLocation,
}

/// An attribute declared in an interface body.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeNode {
    pub name: String,
    pub ty: TypeNode,
    pub is_readonly: bool,
    pub location: SourceLocation,
}

/// An operation parameter with its passing direction.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterNode {
    pub direction: ParamDirection,
    pub ty: TypeNode,
    pub name: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDirection {
    In,
    Out,
    InOut,
}

/// A type specification.
///
/// Every type resolves to a basic-type leaf, a template leaf (sequence or
/// string), a scoped-name reference, or a fixed-dimension array. Array
/// dimensions are never empty and each dimension is at least 1.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Basic {
        ty: BasicType,
        location: SourceLocation,
    },
    Sequence {
        element: Box<TypeNode>,
        bound: Option<u64>,
        location: SourceLocation,
    },
    String {
        bound: Option<u64>,
        wide: bool,
        location: SourceLocation,
    },
    ScopedName {
        parts: Vec<String>,
        absolute: bool,
        location: SourceLocation,
    },
    Array {
        element: Box<TypeNode>,
        dimensions: Vec<u64>,
        location: SourceLocation,
    },
}

impl TypeNode {
    pub fn location(&self) -> &SourceLocation {
        match self {
            TypeNode::Basic { location, .. }
            | TypeNode::Sequence { location, .. }
            | TypeNode::String { location, .. }
            | TypeNode::ScopedName { location, .. }
            | TypeNode::Array { location, .. } => location,
        }
    }

    /// Render a scoped name back to IDL syntax, e.g. `::A::B`.
    pub fn scoped_name_to_string(parts: &[String], absolute: bool) -> String {
        let mut result = String::new();
        if absolute {
            result.push_str("::");
        }
        result.push_str(&parts.join("::"));
        result
    }
}

/// The IDL basic types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicType {
    Void,
    Boolean,
    Char,
    WChar,
    Octet,
    Short,
    UShort,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    LongDouble,
    Any,
    Object,
}

impl BasicType {
    /// The IDL spelling.
    pub fn idl_name(&self) -> &'static str {
        match self {
            BasicType::Void => "void",
            BasicType::Boolean => "boolean",
            BasicType::Char => "char",
            BasicType::WChar => "wchar",
            BasicType::Octet => "octet",
            BasicType::Short => "short",
            BasicType::UShort => "unsigned short",
            BasicType::Long => "long",
            BasicType::ULong => "unsigned long",
            BasicType::LongLong => "long long",
            BasicType::ULongLong => "unsigned long long",
            BasicType::Float => "float",
            BasicType::Double => "double",
            BasicType::LongDouble => "long double",
            BasicType::Any => "any",
            BasicType::Object => "Object",
        }
    }
}

/// A folded constant value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl ConstValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ConstValue::Int(v) if *v >= 0 => Some(*v as u64),
            ConstValue::UInt(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_name_rendering() {
        let parts = vec!["A".to_string(), "B".to_string()];
        assert_eq!(TypeNode::scoped_name_to_string(&parts, false), "A::B");
        assert_eq!(TypeNode::scoped_name_to_string(&parts, true), "::A::B");
    }

    #[test]
    fn const_value_as_u64() {
        assert_eq!(ConstValue::Int(16).as_u64(), Some(16));
        assert_eq!(ConstValue::Int(-1).as_u64(), None);
        assert_eq!(ConstValue::UInt(7).as_u64(), Some(7));
        assert_eq!(ConstValue::Bool(true).as_u64(), None);
    }
}
