use crate::shared::models::{MethodRef, TypeRef};

/// Resolves types and their declared methods by name
pub trait MethodResolver: Send + Sync {
    fn lookup_type(&self, name: &str) -> Option<TypeRef>;

    /// Methods declared directly by `declaring`, in declaration order
    fn declared_methods(&self, declaring: &TypeRef) -> Vec<MethodRef>;
}
