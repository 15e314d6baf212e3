//! Nested literal handling: structural checks during candidate evaluation,
//! exactly one full resolution per literal node afterwards.

mod common;

use colit_solver::{
    CallExpr, CallableSignature, DeferredShape, ElementExpr, ExprArena, LiteralExpr, ParamDecl,
    ResolveError, Resolver, TypeId,
};
use common::Fixture;

#[test]
fn nested_literals_resolve_once_despite_multiple_candidates() {
    common::init_logging();
    let fx = Fixture::new();
    let name = fx.strings.intern("grid");
    fx.signatures.register(CallableSignature::new(
        name,
        vec![ParamDecl::fixed(fx.list_of(fx.list_of(TypeId::INT)))],
        TypeId::BOOLEAN,
    ));
    fx.signatures.register(CallableSignature::new(
        name,
        vec![ParamDecl::fixed(fx.list_of(fx.list_of(TypeId::DOUBLE)))],
        TypeId::BOOLEAN,
    ));

    let mut arena = ExprArena::new();
    let inner = arena.alloc(LiteralExpr::new(vec![ElementExpr::Plain(TypeId::INT)]));
    let outer = arena.alloc(LiteralExpr::new(vec![ElementExpr::Literal(inner)]));
    let call = CallExpr::new(name, vec![ElementExpr::Literal(outer)]);

    let ctx = fx.call_context();
    let mut relation = fx.relation();
    let mut resolver = Resolver::new(&ctx, &mut relation);
    let resolved = resolver.resolve_call(&arena, &call).unwrap();

    assert_eq!(
        resolved.bindings.literal_types[&inner],
        fx.list_of(TypeId::INT)
    );

    // Both candidates were tried, but the inner literal went through full
    // resolution only after the winner was fixed.
    let stats = resolver.stats();
    assert_eq!(stats.candidates_evaluated, 2);
    assert_eq!(stats.literal_resolutions.get(&inner), Some(&1));
    assert_eq!(stats.literal_resolutions.get(&outer), None);
}

#[test]
fn deep_nesting_assigns_a_type_to_every_level() {
    let fx = Fixture::new();
    let level2 = fx.list_of(TypeId::INT);
    let level1 = fx.list_of(level2);
    let level0 = fx.list_of(level1);
    let name = fx.strings.intern("cube");
    fx.signatures.register(CallableSignature::new(
        name,
        vec![ParamDecl::fixed(level0)],
        TypeId::BOOLEAN,
    ));

    let mut arena = ExprArena::new();
    let innermost = arena.alloc(LiteralExpr::new(vec![ElementExpr::Plain(TypeId::INT)]));
    let middle = arena.alloc(LiteralExpr::new(vec![ElementExpr::Literal(innermost)]));
    let outer = arena.alloc(LiteralExpr::new(vec![ElementExpr::Literal(middle)]));
    let call = CallExpr::new(name, vec![ElementExpr::Literal(outer)]);

    let ctx = fx.call_context();
    let mut relation = fx.relation();
    let mut resolver = Resolver::new(&ctx, &mut relation);
    let resolved = resolver.resolve_call(&arena, &call).unwrap();

    assert_eq!(resolved.bindings.literal_types[&outer], level0);
    assert_eq!(resolved.bindings.literal_types[&middle], level1);
    assert_eq!(resolved.bindings.literal_types[&innermost], level2);
    assert_eq!(resolved.bindings.elem_types[&innermost], TypeId::INT);

    let stats = resolver.stats();
    assert_eq!(stats.literal_resolutions.get(&middle), Some(&1));
    assert_eq!(stats.literal_resolutions.get(&innermost), Some(&1));
}

#[test]
fn nested_element_mismatch_rejects_the_outer_candidate() {
    let fx = Fixture::new();
    let name = fx.strings.intern("grid");
    fx.signatures.register(CallableSignature::new(
        name,
        vec![ParamDecl::fixed(fx.list_of(fx.list_of(TypeId::INT)))],
        TypeId::BOOLEAN,
    ));

    let mut arena = ExprArena::new();
    let inner = arena.alloc(LiteralExpr::new(vec![ElementExpr::Plain(TypeId::STRING)]));
    let outer = arena.alloc(LiteralExpr::new(vec![ElementExpr::Literal(inner)]));
    let call = CallExpr::new(name, vec![ElementExpr::Literal(outer)]);

    let mut relation = fx.relation();
    let err = fx.resolve(&mut relation, &arena, &call).unwrap_err();
    assert!(matches!(err, ResolveError::NoApplicableCandidate { .. }));
}

#[test]
fn nested_annotation_picks_the_subtype_container() {
    let fx = Fixture::new();
    let name = fx.strings.intern("consume");
    fx.signatures.register(CallableSignature::new(
        name,
        vec![ParamDecl::fixed(fx.list_of(fx.collection_of(TypeId::INT)))],
        TypeId::BOOLEAN,
    ));

    let mut arena = ExprArena::new();
    // The inner literal names List<Int> where Collection<Int> is expected.
    let inner = arena.alloc(LiteralExpr::annotated(
        vec![ElementExpr::Plain(TypeId::INT)],
        fx.list_of(TypeId::INT),
    ));
    let outer = arena.alloc(LiteralExpr::new(vec![ElementExpr::Literal(inner)]));
    let call = CallExpr::new(name, vec![ElementExpr::Literal(outer)]);

    let mut relation = fx.relation();
    let resolved = fx.resolve(&mut relation, &arena, &call).unwrap();
    assert_eq!(
        resolved.bindings.literal_types[&inner],
        fx.list_of(TypeId::INT)
    );
}

#[test]
fn nested_lambda_with_wider_explicit_parameter_is_accepted() {
    let fx = Fixture::new();
    let int_to_int = fx.interner.function([TypeId::INT], TypeId::INT);
    let name = fx.strings.intern("stages");
    fx.signatures.register(CallableSignature::new(
        name,
        vec![ParamDecl::fixed(fx.list_of(fx.list_of(int_to_int)))],
        TypeId::BOOLEAN,
    ));

    let mut arena = ExprArena::new();
    // A lambda written over Double can stand in an (Int) -> Int slot by
    // contravariance once Int <: Double holds.
    let inner = arena.alloc(LiteralExpr::new(vec![ElementExpr::Deferred(
        DeferredShape::with_params(vec![Some(TypeId::DOUBLE)]),
    )]));
    let outer = arena.alloc(LiteralExpr::new(vec![ElementExpr::Literal(inner)]));
    let call = CallExpr::new(name, vec![ElementExpr::Literal(outer)]);

    let mut relation = fx.relation_with_widening();
    let resolved = fx.resolve(&mut relation, &arena, &call).unwrap();
    assert_eq!(
        resolved.bindings.literal_types[&inner],
        fx.list_of(int_to_int)
    );
    assert_eq!(resolved.bindings.elem_types[&inner], int_to_int);
}

#[test]
fn nested_lambda_with_incompatible_explicit_parameter_rejects_the_candidate() {
    let fx = Fixture::new();
    let int_to_int = fx.interner.function([TypeId::INT], TypeId::INT);
    let name = fx.strings.intern("stages");
    fx.signatures.register(CallableSignature::new(
        name,
        vec![ParamDecl::fixed(fx.list_of(fx.list_of(int_to_int)))],
        TypeId::BOOLEAN,
    ));

    let mut arena = ExprArena::new();
    let inner = arena.alloc(LiteralExpr::new(vec![ElementExpr::Deferred(
        DeferredShape::with_params(vec![Some(TypeId::STRING)]),
    )]));
    let outer = arena.alloc(LiteralExpr::new(vec![ElementExpr::Literal(inner)]));
    let call = CallExpr::new(name, vec![ElementExpr::Literal(outer)]);

    // The written parameter type is found incompatible during the deferred
    // structural check, so the only candidate is discarded.
    let mut relation = fx.relation_with_widening();
    let err = fx.resolve(&mut relation, &arena, &call).unwrap_err();
    assert!(matches!(err, ResolveError::NoApplicableCandidate { .. }));
}

#[test]
fn standalone_literal_resolution_against_a_known_type() {
    let fx = Fixture::new();
    let list_int = fx.list_of(TypeId::INT);

    let mut arena = ExprArena::new();
    let literal = arena.alloc(LiteralExpr::new(vec![
        ElementExpr::Plain(TypeId::INT),
        ElementExpr::Plain(TypeId::INT),
    ]));

    let ctx = fx.call_context();
    let mut relation = fx.relation();
    let mut resolver = Resolver::new(&ctx, &mut relation);
    let bindings = resolver.resolve_literal(&arena, literal, list_int).unwrap();
    assert_eq!(bindings.return_type, list_int);
    assert_eq!(bindings.elem_types[&literal], TypeId::INT);
}
