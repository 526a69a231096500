//! Name-based word type classifier

use ahash::AHashSet as HashSet;
use std::sync::Arc;

use crate::features::graph_kit::ports::WordTypes;
use crate::shared::models::{Stamp, TypeRef, ValueKind};

/// Treats every type whose name is registered as a raw machine word
#[derive(Debug, Clone)]
pub struct NamedWordTypes {
    names: HashSet<Arc<str>>,
    word_kind: ValueKind,
}

impl NamedWordTypes {
    /// 64-bit words
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            word_kind: ValueKind::Long,
        }
    }

    pub fn with_word_kind(mut self, kind: ValueKind) -> Self {
        self.word_kind = kind;
        self
    }
}

impl WordTypes for NamedWordTypes {
    fn is_word(&self, ty: &TypeRef) -> bool {
        ty.kind() == ValueKind::Object && self.names.contains(ty.name())
    }

    fn word_stamp(&self, _ty: &TypeRef) -> Stamp {
        Stamp::for_kind(self.word_kind)
    }
}
