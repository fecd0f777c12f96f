//! A goal naming a `robot`-typed constant can never be satisfied by a schema whose only
//! matching effect is parametrized over a `box`-typed variable: the flat ontology refuses to
//! codesignate the two, so the `Add step` resolution fails for every candidate and the search
//! exhausts on its very first expansion.

use poclsolver::argument::{Argument, VarKind};
use poclsolver::bindings::symbolic::TypeOntology;
use poclsolver::id::IdGen;
use poclsolver::operator::{LiteralTemplate, OperatorSchema};
use poclsolver::problem::{Domain, Problem};
use poclsolver::search::Termination;
use std::collections::HashMap;
use std::time::Duration;

mod common;

fn paint_schema() -> OperatorSchema {
    OperatorSchema {
        step_num: 0,
        name: "paint".to_string(),
        params: vec![("box".to_string(), "?x".to_string(), VarKind::Object)],
        preconds: Vec::new(),
        effects: vec![LiteralTemplate::pos("painted", vec![0])],
        nonequals: Vec::new(),
        reach_pairs: Vec::new(),
        dimensions: Vec::new(),
        path_endpoints: Vec::new(),
        instantiable: true,
        height: 0,
        candidate_map: HashMap::new(),
        threat_map: HashMap::new(),
    }
}

#[test]
fn a_goal_on_an_incompatible_type_exhausts_the_search_immediately() {
    let idgen = IdGen::new();
    let robot = Argument::constant(idgen.next(), "robot", "robotA", VarKind::Object);

    let domain = Domain {
        name: "paint_shop".into(),
        schemas: vec![paint_schema()],
        ontology: TypeOntology::flat(vec!["box".into(), "robot".into()]),
    };
    let mut areas = HashMap::new();
    areas.insert("base".to_string(), common::square(0.0, 0.0, 2.0));
    let problem = Problem {
        domain: "paint_shop".into(),
        objects: vec![robot.clone()],
        object_dimensions: HashMap::new(),
        initial_positions: HashMap::new(),
        areas,
        base_area: "base".into(),
        robot_reach: HashMap::new(),
        init_facts: Vec::new(),
        goal: vec![("painted".to_string(), vec![robot.id()], true)],
    };

    let (solution, report) = poclsolver::solve(&domain, &problem, Some(Duration::from_secs(2))).unwrap();
    assert!(solution.is_none());
    assert_eq!(report.termination, Termination::Exhausted);
    assert_eq!(report.nodes_expanded, 1);
    assert_eq!(report.leaves_pruned, 1);
}
