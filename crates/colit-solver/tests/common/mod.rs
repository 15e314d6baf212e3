//! Shared registration fixture for integration tests.
//!
//! Registers a small container hierarchy (`List<E> <: Collection<E>`,
//! `Set<E>`) with variadic-anchor factories, mirroring the kind of
//! registration a host front end performs once at startup.

// Not every test binary touches every helper.
#![allow(dead_code)]

use colit_common::interner::Interner;
use colit_solver::{
    CallContext, CallExpr, DefId, DefinitionInfo, DefinitionStore, ExprArena, FactoryArity,
    FactoryDecl, FactoryFlags, FactoryRegistry, ResolveError, ResolvedCall, Resolver,
    SignatureTable, StructuralRelation, TypeData, TypeId, TypeInterner, TypeParamInfo,
};

/// Opt-in tracing for test debugging: `COLIT_LOG=trace cargo test`.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("COLIT_LOG"))
        .with_test_writer()
        .try_init();
}

pub struct Fixture {
    pub strings: Interner,
    pub interner: TypeInterner,
    pub defs: DefinitionStore,
    pub signatures: SignatureTable,
    pub factories: FactoryRegistry,
    pub collection: DefId,
    pub list: DefId,
    pub set: DefId,
    pub elem_param: TypeParamInfo,
}

impl Fixture {
    pub fn new() -> Self {
        let strings = Interner::new();
        let interner = TypeInterner::new();
        let defs = DefinitionStore::new();

        let elem_param = TypeParamInfo::new(strings.intern("E"));
        let collection = defs.register(DefinitionInfo::container(
            strings.intern("Collection"),
            vec![elem_param.clone()],
        ));
        let list = defs.register(
            DefinitionInfo::container(strings.intern("List"), vec![elem_param.clone()])
                .with_extends(collection),
        );
        let set = defs.register(DefinitionInfo::container(
            strings.intern("Set"),
            vec![elem_param.clone()],
        ));

        let factories = FactoryRegistry::new();
        for def in [list, set] {
            factories
                .register(
                    &interner,
                    def,
                    elem_param.clone(),
                    &[anchor_decl(&interner, def, &elem_param)],
                )
                .expect("fixture factory registration");
        }

        Self {
            strings,
            interner,
            defs,
            signatures: SignatureTable::new(),
            factories,
            collection,
            list,
            set,
            elem_param,
        }
    }

    pub fn list_of(&self, elem: TypeId) -> TypeId {
        self.interner.application(self.list, [elem])
    }

    pub fn set_of(&self, elem: TypeId) -> TypeId {
        self.interner.application(self.set, [elem])
    }

    pub fn collection_of(&self, elem: TypeId) -> TypeId {
        self.interner.application(self.collection, [elem])
    }

    pub fn type_param(&self, name: &str) -> (TypeParamInfo, TypeId) {
        let info = TypeParamInfo::new(self.strings.intern(name));
        let ty = self.interner.intern(TypeData::TypeParameter(info.clone()));
        (info, ty)
    }

    pub fn relation(&self) -> StructuralRelation<'_> {
        StructuralRelation::new(&self.interner, &self.defs)
    }

    /// Relation with the numeric widening edge `Int <: Double`.
    pub fn relation_with_widening(&self) -> StructuralRelation<'_> {
        let mut relation = self.relation();
        relation.add_edge(TypeId::INT, TypeId::DOUBLE);
        relation
    }

    pub fn call_context(&self) -> CallContext<'_> {
        CallContext {
            interner: &self.interner,
            defs: &self.defs,
            signatures: &self.signatures,
            factories: &self.factories,
        }
    }

    pub fn resolve(
        &self,
        relation: &mut StructuralRelation<'_>,
        arena: &ExprArena,
        call: &CallExpr,
    ) -> Result<ResolvedCall, ResolveError> {
        let ctx = self.call_context();
        let mut resolver = Resolver::new(&ctx, relation);
        resolver.resolve_call(arena, call)
    }
}

/// The variadic anchor signature `of(vararg elements: E): C<E>`.
pub fn anchor_decl(
    interner: &TypeInterner,
    def: DefId,
    elem_param: &TypeParamInfo,
) -> FactoryDecl {
    let elem = interner.intern(TypeData::TypeParameter(elem_param.clone()));
    FactoryDecl {
        arity: FactoryArity::Variadic,
        elem,
        ret: interner.application(def, [elem]),
        has_receiver: false,
        flags: FactoryFlags::empty(),
        foreign: false,
    }
}

/// A fixed-arity convenience member `of(e1, ..., eN): C<E>`.
pub fn fixed_decl(
    interner: &TypeInterner,
    def: DefId,
    elem_param: &TypeParamInfo,
    count: usize,
) -> FactoryDecl {
    let elem = interner.intern(TypeData::TypeParameter(elem_param.clone()));
    FactoryDecl {
        arity: FactoryArity::Fixed(count),
        elem,
        ret: interner.application(def, [elem]),
        has_receiver: false,
        flags: FactoryFlags::empty(),
        foreign: false,
    }
}
