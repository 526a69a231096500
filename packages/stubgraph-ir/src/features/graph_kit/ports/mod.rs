//! Collaborator ports
//!
//! The kit never resolves methods or computes stamps itself; it asks these.

pub mod method_resolver;
pub mod stamp_provider;
pub mod word_types;

use std::sync::Arc;

pub use method_resolver::MethodResolver;
pub use stamp_provider::{DeclaredTypeStamps, StampProvider};
pub use word_types::WordTypes;

/// Collaborators handed to a `GraphKit`
#[derive(Clone)]
pub struct Providers {
    pub resolver: Arc<dyn MethodResolver>,
    pub stamps: Arc<dyn StampProvider>,
    pub word_types: Option<Arc<dyn WordTypes>>,
}

impl Providers {
    pub fn new(resolver: Arc<dyn MethodResolver>) -> Self {
        Self {
            resolver,
            stamps: Arc::new(DeclaredTypeStamps),
            word_types: None,
        }
    }

    pub fn with_stamp_provider(mut self, stamps: Arc<dyn StampProvider>) -> Self {
        self.stamps = stamps;
        self
    }

    pub fn with_word_types(mut self, word_types: Arc<dyn WordTypes>) -> Self {
        self.word_types = Some(word_types);
        self
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers")
            .field("word_types", &self.word_types.is_some())
            .finish_non_exhaustive()
    }
}
