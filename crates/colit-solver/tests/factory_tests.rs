//! Factory capability registration: structural validation of member sets
//! and the consequences of a rejected registration.

mod common;

use colit_solver::{
    DefinitionInfo, FactoryArity, FactoryFlags, FactoryMember, NoFactory,
    RegistrationError, TypeData, TypeId, TypeParamInfo,
};
use common::{Fixture, anchor_decl, fixed_decl};

fn fresh_def(fx: &Fixture, name: &str) -> colit_solver::DefId {
    fx.defs.register(DefinitionInfo::container(
        fx.strings.intern(name),
        vec![fx.elem_param.clone()],
    ))
}

#[test]
fn two_variadic_members_are_a_duplicate_anchor() {
    let fx = Fixture::new();
    let def = fresh_def(&fx, "Bag");
    let err = fx
        .factories
        .register(
            &fx.interner,
            def,
            fx.elem_param.clone(),
            &[
                anchor_decl(&fx.interner, def, &fx.elem_param),
                anchor_decl(&fx.interner, def, &fx.elem_param),
            ],
        )
        .unwrap_err();
    assert_eq!(err, RegistrationError::DuplicateAnchor);
    // The rejected capability never becomes usable.
    assert!(fx.factories.lookup_def(def).is_err());
}

#[test]
fn fixed_members_alone_lack_an_anchor() {
    let fx = Fixture::new();
    let def = fresh_def(&fx, "Pair");
    let err = fx
        .factories
        .register(
            &fx.interner,
            def,
            fx.elem_param.clone(),
            &[fixed_decl(&fx.interner, def, &fx.elem_param, 2)],
        )
        .unwrap_err();
    assert_eq!(err, RegistrationError::MissingAnchor);
}

#[test]
fn receiver_bearing_member_is_rejected() {
    let fx = Fixture::new();
    let def = fresh_def(&fx, "Builder");
    let mut decl = anchor_decl(&fx.interner, def, &fx.elem_param);
    decl.has_receiver = true;
    let err = fx
        .factories
        .register(&fx.interner, def, fx.elem_param.clone(), &[decl])
        .unwrap_err();
    assert_eq!(err, RegistrationError::ReceiverNotAllowed);
}

#[test]
fn anchor_returning_a_different_type_is_rejected() {
    let fx = Fixture::new();
    let def = fresh_def(&fx, "Stack");
    let mut decl = anchor_decl(&fx.interner, def, &fx.elem_param);
    // Claims to construct a List instead of itself.
    decl.ret = fx.interner.application(fx.list, [decl.elem]);
    let err = fx
        .factories
        .register(&fx.interner, def, fx.elem_param.clone(), &[decl])
        .unwrap_err();
    assert_eq!(err, RegistrationError::ReturnTypeMismatch);
}

#[test]
fn members_disagreeing_on_return_type_are_rejected() {
    let fx = Fixture::new();
    let def = fresh_def(&fx, "Stack");
    let anchor = anchor_decl(&fx.interner, def, &fx.elem_param);
    let mut fixed = fixed_decl(&fx.interner, def, &fx.elem_param, 1);
    fixed.ret = fx.interner.application(fx.list, [fixed.elem]);
    let err = fx
        .factories
        .register(&fx.interner, def, fx.elem_param.clone(), &[anchor, fixed])
        .unwrap_err();
    assert_eq!(err, RegistrationError::InconsistentReturnTypes);
}

#[test]
fn member_with_a_different_element_type_is_rejected() {
    let fx = Fixture::new();
    let def = fresh_def(&fx, "IntBag");
    let anchor = anchor_decl(&fx.interner, def, &fx.elem_param);
    let mut fixed = fixed_decl(&fx.interner, def, &fx.elem_param, 1);
    fixed.elem = TypeId::INT;
    let err = fx
        .factories
        .register(&fx.interner, def, fx.elem_param.clone(), &[anchor, fixed])
        .unwrap_err();
    assert_eq!(err, RegistrationError::ParameterShapeDivergence);
}

#[test]
fn member_with_a_differently_bounded_parameter_is_rejected() {
    let fx = Fixture::new();
    let def = fresh_def(&fx, "NumBag");
    let anchor = anchor_decl(&fx.interner, def, &fx.elem_param);
    // Same name, extra bound: a structurally different type parameter.
    let bounded = TypeParamInfo::with_constraint(fx.elem_param.name, TypeId::DOUBLE);
    let mut fixed = fixed_decl(&fx.interner, def, &fx.elem_param, 1);
    fixed.elem = fx.interner.intern(TypeData::TypeParameter(bounded));
    let err = fx
        .factories
        .register(&fx.interner, def, fx.elem_param.clone(), &[anchor, fixed])
        .unwrap_err();
    assert_eq!(err, RegistrationError::ParameterShapeDivergence);
}

#[test]
fn rejected_registration_leaves_no_capability_behind() {
    let fx = Fixture::new();
    let def = fresh_def(&fx, "Pair");
    let result = fx.factories.register(
        &fx.interner,
        def,
        fx.elem_param.clone(),
        &[fixed_decl(&fx.interner, def, &fx.elem_param, 2)],
    );
    assert!(result.is_err());
    assert!(matches!(fx.factories.lookup_def(def), Err(NoFactory)));
}

#[test]
fn flags_and_origin_are_carried_through_validation() {
    let fx = Fixture::new();
    let def = fresh_def(&fx, "Channel");
    let mut anchor = anchor_decl(&fx.interner, def, &fx.elem_param);
    anchor.flags = FactoryFlags::INLINE | FactoryFlags::SUSPEND;
    anchor.foreign = true;
    fx.factories
        .register(&fx.interner, def, fx.elem_param.clone(), &[anchor])
        .unwrap();

    let capability = fx.factories.lookup_def(def).unwrap();
    let member: &FactoryMember = capability.anchor_member();
    assert_eq!(member.arity, FactoryArity::Variadic);
    assert!(member.flags.contains(FactoryFlags::INLINE));
    assert!(member.flags.contains(FactoryFlags::SUSPEND));
    assert!(!member.flags.contains(FactoryFlags::TAILREC));
    assert!(member.foreign);
}

#[test]
fn member_selection_prefers_an_exact_arity_match() {
    let fx = Fixture::new();
    let def = fresh_def(&fx, "Tuplish");
    fx.factories
        .register(
            &fx.interner,
            def,
            fx.elem_param.clone(),
            &[
                anchor_decl(&fx.interner, def, &fx.elem_param),
                fixed_decl(&fx.interner, def, &fx.elem_param, 2),
                fixed_decl(&fx.interner, def, &fx.elem_param, 3),
            ],
        )
        .unwrap();

    let capability = fx.factories.lookup_def(def).unwrap();
    assert_eq!(
        capability.members[capability.member_for_count(2).0].arity,
        FactoryArity::Fixed(2)
    );
    assert_eq!(
        capability.members[capability.member_for_count(3).0].arity,
        FactoryArity::Fixed(3)
    );
    // No exact match falls back to the anchor.
    assert_eq!(capability.member_for_count(7), capability.anchor);
    assert_eq!(capability.member_for_count(0), capability.anchor);
}

#[test]
fn lookup_by_type_requires_a_registered_definition() {
    let fx = Fixture::new();
    // Collection never registered a factory; intrinsics have no definition.
    assert!(
        fx.factories
            .lookup(&fx.interner, fx.collection_of(TypeId::INT))
            .is_err()
    );
    assert!(fx.factories.lookup(&fx.interner, TypeId::INT).is_err());
    assert!(
        fx.factories
            .lookup(&fx.interner, fx.list_of(TypeId::INT))
            .is_ok()
    );
}
