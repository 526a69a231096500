//! Kit and resolver fixtures
//!
//! `Stubs` declares:
//! - `static int f(int)`, `static int g(int)`
//! - `static boolean regionEquals(Pointer, Pointer, int)` (word-typed args)
//! - `void reset(int)` (instance)
//! - `static void stub(int)`: the stub being built

use std::sync::Arc;

use stubgraph_ir::{
    FrameStateBuilder, GraphKit, KitConfig, MetaAccess, MethodRef, NamedWordTypes, NodeId,
    Providers, TypeRef, ValueKind,
};

pub fn stubs_type() -> TypeRef {
    TypeRef::object("Stubs")
}

pub fn int_type() -> TypeRef {
    TypeRef::primitive(ValueKind::Int)
}

pub fn stub_method() -> MethodRef {
    MethodRef::new_static(stubs_type(), "stub", vec![int_type()], TypeRef::void())
}

pub fn fixture_meta_access() -> MetaAccess {
    let pointer = TypeRef::object("Pointer");
    MetaAccess::new()
        .with_method(MethodRef::new_static(stubs_type(), "f", vec![int_type()], int_type()))
        .with_method(MethodRef::new_static(stubs_type(), "g", vec![int_type()], int_type()))
        .with_method(MethodRef::new_static(
            stubs_type(),
            "regionEquals",
            vec![pointer.clone(), pointer, int_type()],
            TypeRef::primitive(ValueKind::Boolean),
        ))
        .with_method(MethodRef::new_instance(
            stubs_type(),
            "reset",
            vec![int_type()],
            TypeRef::void(),
        ))
        .with_method(stub_method())
}

pub fn fixture_providers() -> Providers {
    Providers::new(Arc::new(fixture_meta_access()))
        .with_word_types(Arc::new(NamedWordTypes::new(["Pointer"])))
}

pub fn fixture_kit() -> GraphKit {
    fixture_kit_with(KitConfig::default())
}

pub fn fixture_kit_with(config: KitConfig) -> GraphKit {
    GraphKit::new(stub_method(), fixture_providers(), config).expect("valid fixture config")
}

/// Kit plus a frame-state builder holding the stub's parameter `x`
pub fn fixture_kit_with_state() -> (GraphKit, FrameStateBuilder, NodeId) {
    let mut kit = fixture_kit();
    let mut fsb = FrameStateBuilder::new(stub_method());
    let params = fsb
        .init_parameters(kit.graph_mut())
        .expect("parameters of the fixture stub");
    (kit, fsb, params[0])
}
