//! Running the same domain/problem through `solve` twice must produce byte-identical plans: the
//! frontier's tie-breaking depends only on ids minted from one run-scoped counter, never on
//! hashing or scheduling order.

use poclsolver::argument::{Argument, VarKind};
use poclsolver::bindings::symbolic::TypeOntology;
use poclsolver::id::IdGen;
use poclsolver::operator::{LiteralTemplate, OperatorSchema};
use poclsolver::problem::{Domain, Problem};
use poclsolver::search::Termination;
use std::collections::HashMap;
use std::time::Duration;

mod common;

fn drop_schema() -> OperatorSchema {
    OperatorSchema {
        step_num: 0,
        name: "drop".to_string(),
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
        threat_map: HashMap::new(),
    }
}

#[test]
fn solving_the_same_problem_twice_yields_the_same_plan() {
    let idgen = IdGen::new();
    let obj = Argument::constant(idgen.next(), "box", "boxA", VarKind::Object);

    let domain = Domain {
        name: "blocks".into(),
        schemas: vec![drop_schema()],
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
        init_facts: vec![("holds".to_string(), vec![obj.id()])],
        goal: vec![("placed".to_string(), vec![obj.id()], true)],
    };

    let (solution1, report1) = poclsolver::solve(&domain, &problem, Some(Duration::from_secs(5))).unwrap();
    let (solution2, report2) = poclsolver::solve(&domain, &problem, Some(Duration::from_secs(5))).unwrap();

    assert_eq!(report1.termination, Termination::Solved);
    assert_eq!(report2.termination, Termination::Solved);
    assert_eq!(solution1.unwrap().to_json().to_string(), solution2.unwrap().to_json().to_string());
}
