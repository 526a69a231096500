use crate::shared::models::{Stamp, TypeRef};

/// Maps a declared type to a stamp when the default mapping does not apply
pub trait StampProvider: Send + Sync {
    fn overriding_stamp(&self, ty: &TypeRef) -> Option<Stamp>;
}

/// Provider that never overrides
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclaredTypeStamps;

impl StampProvider for DeclaredTypeStamps {
    fn overriding_stamp(&self, _ty: &TypeRef) -> Option<Stamp> {
        None
    }
}
