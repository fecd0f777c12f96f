//! Two independent `place` steps resolved with no disjunction between them land on identical,
//! fully-overlapping placements (the grid sweep is deterministic and starts from the same bbox
//! corner each time). Raising a geometric threat flaw between them should resolve the same way a
//! threatened causal link does: order one step's placement fully before the other's.

mod common;

use poclsolver::argument::VarKind;
use poclsolver::bindings::symbolic::TypeOntology;
use poclsolver::id::IdGen;
use poclsolver::operator::{OperatorSchema, Step};
use poclsolver::plan::Plan;
use poclsolver::problem::{Domain, Problem};
use std::collections::HashMap;

fn place_schema() -> OperatorSchema {
    OperatorSchema {
        step_num: 0,
        name: "place".to_string(),
        params: vec![("area".to_string(), "?loc".to_string(), VarKind::Area)],
        preconds: Vec::new(),
        effects: Vec::new(),
        nonequals: Vec::new(),
        reach_pairs: Vec::new(),
        dimensions: vec![(0, 0.5, 0.5)],
        path_endpoints: Vec::new(),
        instantiable: true,
        height: 0,
        candidate_map: HashMap::new(),
        threat_map: HashMap::new(),
    }
}

#[test]
fn overlapping_placements_resolve_by_ordering_one_step_before_the_other() {
    let idgen = IdGen::new();
    let domain = Domain { name: "placement".into(), schemas: vec![place_schema()], ontology: TypeOntology::flat(Vec::new()) };
    let mut areas = HashMap::new();
    areas.insert("base".to_string(), common::square(0.0, 0.0, 2.0));
    let problem = Problem {
        domain: "placement".into(),
        objects: Vec::new(),
        object_dimensions: HashMap::new(),
        initial_positions: HashMap::new(),
        areas,
        base_area: "base".into(),
        robot_reach: HashMap::new(),
        init_facts: Vec::new(),
        goal: Vec::new(),
    };
    let mut plan = Plan::make_root_plan(&domain, &problem, idgen).unwrap();

    let step1 = Step::instantiate(&domain.schemas[0], plan.idgen());
    let area1 = step1.args()[0].id();
    let step1_id = plan.insert_primitive(step1);

    let step2 = Step::instantiate(&domain.schemas[0], plan.idgen());
    let area2 = step2.args()[0].id();
    let step2_id = plan.insert_primitive(step2);

    assert!(plan.bindings_mut().geometric.resolve(area1));
    assert!(plan.bindings_mut().geometric.resolve(area2));
    assert!(plan.bindings().geometric.areas_overlap(area1, area2));

    plan.flaws_mut().insert_gtf(area1, area2);

    // The two areas' own ungrounded-variable flaws are still sitting in the queue, stale since we
    // resolved them directly; draining those is a no-op (both are already assigned) before the
    // geometric threat itself is finally popped.
    let (_, children) = common::drive_while_single(plan, 5);
    assert_eq!(children.len(), 2);
    assert!(children[0].ordering().has_path(step2_id, step1_id));
    assert!(children[1].ordering().has_path(step1_id, step2_id));
}
