//! In-memory method resolver
//!
//! Types and methods are registered up front by the stub compiler (or a test
//! fixture); lookups never fail for registered names.

use ahash::AHashMap as HashMap;
use std::sync::Arc;

use crate::features::graph_kit::ports::MethodResolver;
use crate::shared::models::{MethodRef, TypeRef};

#[derive(Debug, Default, Clone)]
pub struct MetaAccess {
    types: HashMap<Arc<str>, TypeRef>,
    methods: HashMap<Arc<str>, Vec<MethodRef>>,
}

impl MetaAccess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_type(&mut self, ty: TypeRef) -> &mut Self {
        self.types.entry(Arc::from(ty.name())).or_insert(ty);
        self
    }

    /// Register `method` under its declaring type (registering the type too)
    pub fn register_method(&mut self, method: MethodRef) -> &mut Self {
        self.register_type(method.declaring().clone());
        self.methods
            .entry(Arc::from(method.declaring().name()))
            .or_default()
            .push(method);
        self
    }

    pub fn with_method(mut self, method: MethodRef) -> Self {
        self.register_method(method);
        self
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}

impl MethodResolver for MetaAccess {
    fn lookup_type(&self, name: &str) -> Option<TypeRef> {
        self.types.get(name).cloned()
    }

    fn declared_methods(&self, declaring: &TypeRef) -> Vec<MethodRef> {
        self.methods
            .get(declaring.name())
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::ValueKind;

    #[test]
    fn test_registration_order_preserved() {
        let stubs = TypeRef::object("Stubs");
        let a = MethodRef::new_static(stubs.clone(), "a", vec![], TypeRef::void());
        let b = MethodRef::new_static(
            stubs.clone(),
            "b",
            vec![TypeRef::primitive(ValueKind::Int)],
            TypeRef::void(),
        );
        let meta = MetaAccess::new().with_method(a.clone()).with_method(b.clone());

        assert_eq!(meta.lookup_type("Stubs"), Some(stubs.clone()));
        assert_eq!(meta.declared_methods(&stubs), vec![a, b]);
        assert!(meta.lookup_type("Missing").is_none());
        assert!(meta.declared_methods(&TypeRef::object("Other")).is_empty());
        assert_eq!(meta.type_count(), 1);
    }
}
