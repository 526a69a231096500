//! Value categories and stamps

use serde::{Deserialize, Serialize};
use std::fmt;

use super::meta::TypeRef;

/// Value category of a data node or a declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    Object,
    Void,
    Illegal,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Byte => "byte",
            ValueKind::Short => "short",
            ValueKind::Char => "char",
            ValueKind::Int => "int",
            ValueKind::Long => "long",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::Object => "Object",
            ValueKind::Void => "void",
            ValueKind::Illegal => "illegal",
        }
    }

    /// Kind a value of this category occupies on the operand stack.
    /// Sub-int primitives widen to int.
    pub fn stack_kind(self) -> ValueKind {
        match self {
            ValueKind::Boolean | ValueKind::Byte | ValueKind::Short | ValueKind::Char => {
                ValueKind::Int
            }
            other => other,
        }
    }

    pub fn is_primitive(self) -> bool {
        !matches!(
            self,
            ValueKind::Object | ValueKind::Void | ValueKind::Illegal
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type information carried by every node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Stamp {
    pub kind: ValueKind,
    /// Declared type for object stamps (None = any object / primitive)
    pub declared_type: Option<TypeRef>,
    pub non_null: bool,
}

impl Stamp {
    pub fn for_kind(kind: ValueKind) -> Self {
        Self {
            kind,
            declared_type: None,
            non_null: false,
        }
    }

    /// Stamp of control nodes that produce no value
    pub fn void() -> Self {
        Self::for_kind(ValueKind::Void)
    }

    pub fn int() -> Self {
        Self::for_kind(ValueKind::Int)
    }

    pub fn long() -> Self {
        Self::for_kind(ValueKind::Long)
    }

    pub fn boolean() -> Self {
        Self::for_kind(ValueKind::Boolean)
    }

    pub fn object(declared_type: Option<TypeRef>, non_null: bool) -> Self {
        Self {
            kind: ValueKind::Object,
            declared_type,
            non_null,
        }
    }

    /// Default stamp for a value of `ty`, used when no provider overrides it
    pub fn for_declared_type(ty: &TypeRef) -> Self {
        match ty.kind() {
            ValueKind::Object => Self::object(Some(ty.clone()), false),
            kind => Self {
                kind,
                declared_type: Some(ty.clone()),
                non_null: false,
            },
        }
    }

    pub fn stack_kind(&self) -> ValueKind {
        self.kind.stack_kind()
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.declared_type, self.kind) {
            (Some(ty), ValueKind::Object) => {
                write!(f, "a{} {}", if self.non_null { "!" } else { "" }, ty.name())
            }
            _ => f.write_str(self.kind.as_str()),
        }
    }
}
