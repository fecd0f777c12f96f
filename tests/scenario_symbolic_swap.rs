//! A `pickup`/`putdown` pair over `placed`/`holds` where each schema's own negating effect
//! threatens its own precondition. A second, still-ungrounded `putdown` instance is inserted
//! purely to threaten an existing `pickup -> putdown` causal link on `holds`, which should widen
//! into a real threatened-causal-link flaw once its own ungrounded-variable flaw is drained.

mod common;

use poclsolver::argument::{Argument, VarKind};
use poclsolver::bindings::symbolic::TypeOntology;
use poclsolver::id::IdGen;
use poclsolver::literal::Literal;
use poclsolver::operator::{LiteralTemplate, OperatorSchema, Step};
use poclsolver::plan::Plan;
use poclsolver::problem::{Domain, Problem};
use maplit::hashmap;
use std::collections::HashMap;

fn pickup_schema() -> OperatorSchema {
    OperatorSchema {
        step_num: 0,
        name: "pickup".to_string(),
        params: vec![("box".to_string(), "?x".to_string(), VarKind::Object)],
        preconds: vec![LiteralTemplate::pos("placed", vec![0])],
        effects: vec![LiteralTemplate::pos("holds", vec![0]), LiteralTemplate::neg("placed", vec![0])],
        nonequals: Vec::new(),
        reach_pairs: Vec::new(),
        dimensions: Vec::new(),
        path_endpoints: Vec::new(),
        instantiable: true,
        height: 0,
        candidate_map: HashMap::new(),
        threat_map: hashmap! { 0usize => vec![(0usize, 1usize)] },
    }
}

fn putdown_schema() -> OperatorSchema {
    OperatorSchema {
        step_num: 1,
        name: "putdown".to_string(),
        params: vec![("box".to_string(), "?x".to_string(), VarKind::Object)],
        preconds: vec![LiteralTemplate::pos("holds", vec![0])],
        effects: vec![LiteralTemplate::pos("placed", vec![0]), LiteralTemplate::neg("holds", vec![0])],
        nonequals: Vec::new(),
        reach_pairs: Vec::new(),
        dimensions: Vec::new(),
        path_endpoints: Vec::new(),
        instantiable: true,
        height: 0,
        candidate_map: HashMap::new(),
        threat_map: hashmap! { 0usize => vec![(1usize, 1usize)] },
    }
}

#[test]
fn a_second_putdown_instance_threatens_the_holds_link_once_grounded() {
    let idgen = IdGen::new();
    let obj = Argument::constant(idgen.next(), "box", "boxA", VarKind::Object);

    let domain = Domain {
        name: "blocks".into(),
        schemas: vec![pickup_schema(), putdown_schema()],
        ontology: TypeOntology::flat(vec!["box".into()]),
    };
    let mut areas = HashMap::new();
    areas.insert("base".to_string(), common::square(0.0, 0.0, 2.0));
    let problem = Problem {
        domain: "blocks".into(),
        objects: vec![obj.clone()],
        object_dimensions: HashMap::new(),
        initial_positions: HashMap::new(),
        areas,
        base_area: "base".into(),
        robot_reach: HashMap::new(),
        init_facts: Vec::new(),
        goal: Vec::new(),
    };
    let mut plan = Plan::make_root_plan(&domain, &problem, idgen.clone()).unwrap();

    // A grounded `pickup(boxA)` providing `holds(boxA)`, built directly (not through the
    // pool) so its own argument is already a constant and raises no ungrounded-variable flaw.
    let holds_effect = Literal::new(idgen.next(), "holds", vec![obj.clone()], true, false);
    let pickup = Step::new_raw(idgen.next(), 0, "pickup", vec![obj.clone()], Vec::new(), vec![holds_effect.clone()], true);
    let pickup_id = plan.insert_primitive(pickup);

    // A grounded `putdown(boxA)` consuming that `holds(boxA)`.
    let holds_precond = Literal::new(idgen.next(), "holds", vec![obj.clone()], true, false);
    let putdown = Step::new_raw(idgen.next(), 1, "putdown", vec![obj.clone()], vec![holds_precond.clone()], Vec::new(), true);
    let putdown_id = plan.insert_primitive(putdown);

    assert!(plan.bindings_mut().unify(&holds_effect, &holds_precond));
    assert!(plan.resolve_with_primitive(pickup_id, putdown_id, holds_effect.id(), holds_precond.id()));

    // A second, still-ungrounded `putdown` instance: its schema is exactly the one this
    // domain's `threat_map` names as a threat to a `putdown`'s own `holds` precondition, so
    // inserting it raises a potential threat against the link above regardless of which box it
    // eventually grounds to.
    let second_putdown = Step::instantiate(&domain.schemas[1], plan.idgen());
    let second_putdown_id = second_putdown.id();
    let second_arg_id = second_putdown.args()[0].id();
    plan.insert_primitive(second_putdown);

    assert_eq!(plan.potential_tclf().len(), 1);
    let (threat, link) = plan.potential_tclf()[0];
    assert_eq!(threat, second_putdown_id);
    assert_eq!(link.source, pickup_id);
    assert_eq!(link.sink, putdown_id);

    // First call(s) drain the second putdown's own ungrounded-variable flaw; the eventual branch
    // is the threatened-causal-link's promote/demote split.
    let (_, children) = common::drive_while_single(plan, 5);
    assert_eq!(children.len(), 2);
    assert!(children[0].ordering().has_path(link.sink, threat));
    assert!(children[1].ordering().has_path(threat, link.source));

    // sanity: the resolved ungrounded variable really did ground to the only registered constant
    let mut grounded = children[0].clone();
    assert!(grounded.bindings_mut().symbolic.is_codesignated(second_arg_id, obj.id()));
}
