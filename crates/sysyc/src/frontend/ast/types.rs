//! Type specifiers as written in declarations

use super::Ident;
use crate::common::Span;

/// A written type: `int`, `float`, `char`, `void` or `struct Name`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub kind: TypeKind,
    pub span: Span,
}

impl TypeSpec {
    pub fn new(kind: TypeKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn int(span: Span) -> Self {
        Self::new(TypeKind::Int, span)
    }

    /// The struct tag this type refers to, if any
    pub fn struct_name(&self) -> Option<&Ident> {
        match &self.kind {
            TypeKind::Struct(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Void,
    Int,
    Float,
    Char,
    Struct(Ident),
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeKind::Void => write!(f, "void"),
            TypeKind::Int => write!(f, "int"),
            TypeKind::Float => write!(f, "float"),
            TypeKind::Char => write!(f, "char"),
            TypeKind::Struct(name) => write!(f, "struct {}", name.name),
        }
    }
}
