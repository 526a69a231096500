//! Resolved type and method metadata
//!
//! These are produced by the method resolver collaborator; the kit only reads them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::stamp::ValueKind;

/// A resolved type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    name: Arc<str>,
    kind: ValueKind,
}

impl TypeRef {
    /// Primitive (or void) type named after its kind
    pub fn primitive(kind: ValueKind) -> Self {
        Self {
            name: Arc::from(kind.as_str()),
            kind,
        }
    }

    pub fn object(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            kind: ValueKind::Object,
        }
    }

    pub fn void() -> Self {
        Self::primitive(ValueKind::Void)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// How a call target is dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvokeKind {
    Static,
    Special,
    Virtual,
    Interface,
}

impl InvokeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvokeKind::Static => "static",
            InvokeKind::Special => "special",
            InvokeKind::Virtual => "virtual",
            InvokeKind::Interface => "interface",
        }
    }

    pub fn has_receiver(&self) -> bool {
        !matches!(self, InvokeKind::Static)
    }
}

impl fmt::Display for InvokeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared parameter and return types (receiver excluded)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub params: Vec<TypeRef>,
    pub return_type: TypeRef,
}

impl Signature {
    pub fn new(params: Vec<TypeRef>, return_type: TypeRef) -> Self {
        Self {
            params,
            return_type,
        }
    }

    /// Parameter count, counting the receiver when `with_receiver`
    pub fn parameter_count(&self, with_receiver: bool) -> usize {
        self.params.len() + usize::from(with_receiver)
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct MethodData {
    declaring: TypeRef,
    name: Arc<str>,
    is_static: bool,
    signature: Signature,
}

/// A resolved method. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef(Arc<MethodData>);

impl MethodRef {
    pub fn new(
        declaring: TypeRef,
        name: impl Into<Arc<str>>,
        is_static: bool,
        signature: Signature,
    ) -> Self {
        MethodRef(Arc::new(MethodData {
            declaring,
            name: name.into(),
            is_static,
            signature,
        }))
    }

    pub fn new_static(
        declaring: TypeRef,
        name: impl Into<Arc<str>>,
        params: Vec<TypeRef>,
        return_type: TypeRef,
    ) -> Self {
        Self::new(declaring, name, true, Signature::new(params, return_type))
    }

    pub fn new_instance(
        declaring: TypeRef,
        name: impl Into<Arc<str>>,
        params: Vec<TypeRef>,
        return_type: TypeRef,
    ) -> Self {
        Self::new(declaring, name, false, Signature::new(params, return_type))
    }

    pub fn declaring(&self) -> &TypeRef {
        &self.0.declaring
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn is_static(&self) -> bool {
        self.0.is_static
    }

    pub fn signature(&self) -> &Signature {
        &self.0.signature
    }

    pub fn return_type(&self) -> &TypeRef {
        &self.0.signature.return_type
    }

    /// `Declaring.name`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.0.declaring, self.0.name)
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.0.declaring, self.0.name)?;
        for (i, p) in self.0.signature.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ")")
    }
}
