//! A schema that re-establishes its own unsatisfied precondition as one of its effects gives
//! the `Add step` branch an unbounded supply of new providers, so with a short deadline the
//! search runs out of wall-clock time instead of ever exhausting or solving.

use poclsolver::argument::{Argument, VarKind};
use poclsolver::bindings::symbolic::TypeOntology;
use poclsolver::id::IdGen;
use poclsolver::operator::{LiteralTemplate, OperatorSchema};
use poclsolver::problem::{Domain, Problem};
use poclsolver::search::Termination;
use std::collections::HashMap;
use std::time::Duration;

mod common;

fn gen_schema() -> OperatorSchema {
    OperatorSchema {
        step_num: 0,
        name: "gen".to_string(),
        params: vec![("box".to_string(), "?x".to_string(), VarKind::Object)],
        preconds: vec![LiteralTemplate::pos("p", vec![0])],
        effects: vec![LiteralTemplate::pos("q", vec![0]), LiteralTemplate::pos("p", vec![0])],
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
fn an_unboundedly_self_providing_precondition_runs_out_the_clock() {
    let idgen = IdGen::new();
    let obj = Argument::constant(idgen.next(), "box", "boxA", VarKind::Object);

    let domain = Domain {
        name: "unreachable_goal".into(),
        schemas: vec![gen_schema()],
        ontology: TypeOntology::flat(vec!["box".into()]),
    };
    let mut areas = HashMap::new();
    areas.insert("base".to_string(), common::square(0.0, 0.0, 2.0));
    let problem = Problem {
        domain: "unreachable_goal".into(),
        objects: vec![obj.clone()],
        object_dimensions: HashMap::new(),
        initial_positions: HashMap::new(),
        areas,
        base_area: "base".into(),
        robot_reach: HashMap::new(),
        init_facts: Vec::new(),
        goal: vec![("q".to_string(), vec![obj.id()], true)],
    };

    let (solution, report) = poclsolver::solve(&domain, &problem, Some(Duration::from_millis(50))).unwrap();
    assert!(solution.is_none());
    assert_eq!(report.termination, Termination::CutOff);
    assert!(report.nodes_expanded > 0);
}
