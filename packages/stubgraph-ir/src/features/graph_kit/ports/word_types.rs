use crate::shared::models::{Stamp, TypeRef, ValueKind};

/// Classifies reference-shaped types that are really raw machine words
pub trait WordTypes: Send + Sync {
    fn is_word(&self, ty: &TypeRef) -> bool;

    /// Stamp used for values of the word type `ty`
    fn word_stamp(&self, ty: &TypeRef) -> Stamp;

    /// Value kind of `ty`, with word types mapped to the word kind
    fn as_kind(&self, ty: &TypeRef) -> ValueKind {
        if self.is_word(ty) {
            self.word_stamp(ty).kind
        } else {
            ty.kind()
        }
    }
}
