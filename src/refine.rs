// Snowcap: Synthesizing Network-Wide Configuration Updates
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Refinement operators: given a plan, pop its highest-priority flaw and return every plan that
//! resolves it. Each resolution clones the plan first, so siblings never interfere with one
//! another's bindings or ordering.

use crate::causal_link::CausalLink;
use crate::flaw::Flaw;
use crate::id::Id;
use crate::literal::WITHIN;
use crate::operator::Step;
use crate::path_planner;
use crate::plan::Plan;
use log::trace;

/// Resolve `plan`'s highest-priority flaw, returning every resulting child. An empty result
/// means the flaw has no applicable resolution in this branch (a dead end for the search). A
/// flawless plan is a solution and should never be passed here.
pub fn refine(plan: &Plan) -> Vec<Plan> {
    let mut base = plan.clone();
    for (threat, link) in base.potential_tclf().to_vec() {
        base.flaws_mut().insert_tclf(threat, link);
    }
    base.clear_potential_tclf();

    let flaw = match base.flaws_mut().next() {
        Some(f) => f,
        None => return Vec::new(),
    };
    trace!("refining plan {} on flaw {:?}", plan.id(), flaw);

    match flaw {
        Flaw::Opf { consumer, precondition } => refine_opf(&base, consumer, precondition),
        Flaw::Tclf { threat, link } => refine_tclf(&base, threat, link),
        Flaw::Ugsv { arg } => refine_ugsv(&base, arg),
        Flaw::Uggv { arg } => refine_uggv(&base, arg),
        Flaw::Ugpv { arg } => refine_ugpv(&base, arg),
        Flaw::Gtf { threatened, threatening } => refine_geometric_threat(&base, threatened, threatening),
        Flaw::Gptf { path, obstacle } => refine_geometric_threat(&base, path, obstacle),
    }
}

/// Add step / Reuse step / Ground in init, as a single uniform scan: candidate providers are
/// either a freshly-instantiated occurrence of any instantiable schema with a matching effect
/// template, or any already-present step — including the `init` sentinel — whose effect shares
/// the precondition's predicate and polarity. Matching by predicate name and polarity alone
/// (rather than by precomputed schema-local position) is what lets the `goal` sentinel's own
/// preconditions — which have no owning schema of their own — trigger the `Add step` case.
fn refine_opf(base: &Plan, consumer: Id, precondition: Id) -> Vec<Plan> {
    let precond_lit = match base.step(consumer).and_then(|s| s.preconds().iter().find(|p| p.id() == precondition)) {
        Some(p) => p.clone(),
        None => return Vec::new(),
    };
    let mut children = Vec::new();

    for op_schema in base.pool().schemas() {
        if !op_schema.instantiable {
            continue;
        }
        for (eff_idx, effect_tpl) in op_schema.effects.iter().enumerate() {
            if effect_tpl.name != precond_lit.name() || effect_tpl.truth != precond_lit.truth() {
                continue;
            }
            let mut child = base.instantiate("add-step");
            let new_step = Step::instantiate(op_schema, child.idgen());
            let new_step_id = child.insert_primitive(new_step);
            let effect = match child.step(new_step_id).and_then(|s| s.effects().get(eff_idx)).cloned() {
                Some(e) => e,
                None => continue,
            };
            if !child.bindings_mut().unify(&effect, &precond_lit) {
                continue;
            }
            if !child.resolve_with_primitive(new_step_id, consumer, effect.id(), precondition) {
                continue;
            }
            // height is always 0 (decomposition is not implemented), so this reduces to a flat
            // per-step cost of 1.
            let max_height: u32 = 0;
            let step_height = child.step(new_step_id).map(|s| s.height()).unwrap_or(0);
            child.add_cost((max_height.pow(2) + 1) as f64 - (step_height.pow(2)) as f64);
            children.push(child);
        }
    }

    for step in base.steps() {
        if step.id() == consumer || step.id() == base.goal_id() {
            continue;
        }
        if base.ordering().has_path(consumer, step.id()) {
            continue;
        }
        for effect in step.effects() {
            if effect.name() != precond_lit.name() || effect.truth() != precond_lit.truth() {
                continue;
            }
            let label = if step.id() == base.init_id() { "ground-init" } else { "reuse" };
            let mut child = base.instantiate(label);
            if !child.bindings_mut().unify(effect, &precond_lit) {
                continue;
            }
            if !child.resolve_with_primitive(step.id(), consumer, effect.id(), precondition) {
                continue;
            }
            children.push(child);
        }
    }

    children
}

/// Promote the threat after the threatened link's sink, or demote it before the link's source.
fn refine_tclf(base: &Plan, threat: Id, link: CausalLink) -> Vec<Plan> {
    let mut children = Vec::new();
    let mut promote = base.instantiate("promote");
    if promote.ordering_mut().add_edge(link.sink, threat) {
        children.push(promote);
    }
    let mut demote = base.instantiate("demote");
    if demote.ordering_mut().add_edge(threat, link.source) {
        children.push(demote);
    }
    children
}

/// One clone per already-registered constant compatible with `arg`, each trying the
/// codesignation and (for robot-typed variables) propagating any pending reach constraint.
fn refine_ugsv(base: &Plan, arg: Id) -> Vec<Plan> {
    let mut children = Vec::new();
    for obj in base.bindings().symbolic.constant_ids() {
        let mut child = base.instantiate("ugsv");
        if child.bindings_mut().symbolic.add_codesignation(arg, obj) {
            child.bindings_mut().apply_reach(arg);
            children.push(child);
        }
    }
    children
}

/// Try the direct grid-sweep `resolve`; on failure, turn every assigned area currently
/// overlapping `arg`'s max-region into a disjunction, raise a `Gtf` for each, and retry.
fn refine_uggv(base: &Plan, arg: Id) -> Vec<Plan> {
    let mut direct = base.instantiate("uggv");
    if direct.bindings_mut().geometric.resolve(arg) {
        return vec![direct];
    }

    let blockers = base.bindings().geometric.blocking_assigned_areas(arg);
    if blockers.is_empty() {
        return Vec::new();
    }

    let mut child = base.instantiate("uggv-disjoint");
    for other in &blockers {
        child.flaws_mut().insert_gtf(arg, *other);
        child.bindings_mut().geometric.add_disjunction(arg, *other);
    }
    if child.bindings_mut().geometric.resolve(arg) {
        vec![child]
    } else {
        Vec::new()
    }
}

/// Try the direct grid-A* `resolve_path`; on failure, discover every minimum-cardinality set of
/// movable obstacles over the eroded free space and, for each, drop the corresponding
/// disjunctions, raise a `Gptf` per obstacle, and retry.
fn refine_ugpv(base: &Plan, arg: Id) -> Vec<Plan> {
    let mut direct = base.instantiate("ugpv");
    if direct.bindings_mut().geometric.resolve_path(arg) {
        return vec![direct];
    }

    let (eroded, _erosion, start, goal) = match base.bindings().geometric.eroded_free_space(arg) {
        Some(v) => v,
        None => return Vec::new(),
    };
    let obstacles = base.bindings().geometric.assigned_area_polygons();
    let sets = path_planner::find_movable_obstacles(&eroded, &obstacles, start, goal);

    let mut children = Vec::new();
    for set in sets {
        let mut child = base.instantiate("ugpv-move");
        for obstacle in &set {
            child.bindings_mut().geometric.remove_disjunction(arg, *obstacle);
            child.flaws_mut().insert_gptf(arg, *obstacle);
        }
        if child.bindings_mut().geometric.resolve_path(arg) {
            children.push(child);
        }
    }
    children
}

fn owning_step(base: &Plan, var: Id) -> Option<Id> {
    base.steps().iter().find(|s| s.args().iter().any(|a| a.id() == var)).map(|s| s.id())
}

/// `Gtf`/`Gptf` resolution, symmetric to `Tclf`: force one placement's owning step fully before
/// (or after) the other's, so the two can never be simultaneously occupied. `b`'s owning step is
/// `None` exactly when `b` is a static object's initial placement area (registered straight onto
/// the `init` sentinel's effects, never a step's own parameter, i.e. the object never moves in
/// this plan) — promotion/demotion against `init` could never route around it, so that case is
/// handed to [`refine_static_obstacle`] instead, which moves the object out of the way.
fn refine_geometric_threat(base: &Plan, a: Id, b: Id) -> Vec<Plan> {
    let step_a = match owning_step(base, a) {
        Some(s) => s,
        None => return Vec::new(),
    };
    let step_b = match owning_step(base, b) {
        Some(s) => s,
        None => return refine_static_obstacle(base, a, b),
    };
    let mut children = Vec::new();
    let mut promote = base.instantiate("geom-promote");
    if promote.ordering_mut().add_edge(step_b, step_a) {
        children.push(promote);
    }
    let mut demote = base.instantiate("geom-demote");
    if demote.ordering_mut().add_edge(step_a, step_b) {
        children.push(demote);
    }
    children
}

/// Spawn one clone per instantiable schema that has a positive `within(·,·)` effect, each
/// relocating the static obstacle at `b` out from under `a`: instantiate the schema, codesignate
/// its moved-object parameter with `b`'s owner, disjoin its destination area from `a`, and order
/// `a`'s owning step after the move. `a`'s own owning step must already exist (it is the step
/// whose placement or corridor is under threat); if `b` has no recorded owner either, there is
/// nothing to move and the threat has no resolution in this branch.
fn refine_static_obstacle(base: &Plan, a: Id, b: Id) -> Vec<Plan> {
    let step_a = match owning_step(base, a) {
        Some(s) => s,
        None => return Vec::new(),
    };
    let moved_obj = match base.bindings().geometric.owner(b) {
        Some(o) => o,
        None => return Vec::new(),
    };

    let mut children = Vec::new();
    for op_schema in base.pool().schemas() {
        if !op_schema.instantiable {
            continue;
        }
        for effect_tpl in op_schema.effects.iter() {
            if effect_tpl.name != WITHIN || !effect_tpl.truth || effect_tpl.arg_indices.len() != 2 {
                continue;
            }
            let mut child = base.instantiate("move-static-obstacle");
            let new_step = Step::instantiate(op_schema, child.idgen());
            let new_step_id = new_step.id();
            let obj_param = new_step.args()[effect_tpl.arg_indices[0]].id();
            let dest_param = new_step.args()[effect_tpl.arg_indices[1]].id();
            child.insert_primitive(new_step);

            if !child.bindings_mut().symbolic.add_codesignation(obj_param, moved_obj) {
                continue;
            }
            child.bindings_mut().geometric.add_disjunction(dest_param, a);
            if !child.ordering_mut().add_edge(new_step_id, step_a) {
                continue;
            }
            children.push(child);
        }
    }
    children
}

#[cfg(test)]
mod test_refine {
    use super::*;
    use crate::argument::{Argument, VarKind};
    use crate::bindings::symbolic::TypeOntology;
    use crate::id::IdGen;
    use crate::problem::{Domain, Problem};
    use geo::{LineString, Polygon};
    use std::collections::HashMap;

    fn base_square() -> Polygon<f64> {
        Polygon::new(LineString::from(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (0.0, 0.0)]), vec![])
    }

    fn fixture() -> Plan {
        let idgen = IdGen::new();
        let obj = Argument::constant(idgen.next(), "box", "boxA", VarKind::Object);
        let domain = Domain { name: "test".into(), schemas: Vec::new(), ontology: TypeOntology::flat(vec!["box".into()]) };
        let mut areas = HashMap::new();
        areas.insert("base".to_string(), base_square());
        let problem = Problem {
            domain: "test".into(),
            objects: vec![obj.clone()],
            object_dimensions: HashMap::new(),
            initial_positions: HashMap::new(),
            areas,
            base_area: "base".into(),
            robot_reach: HashMap::new(),
            init_facts: vec![("holds".to_string(), vec![obj.id()])],
            goal: vec![("holds".to_string(), vec![obj.id()], true)],
        };
        Plan::make_root_plan(&domain, &problem, idgen).unwrap()
    }

    #[test]
    fn ground_in_init_resolves_a_goal_fact_already_true_initially() {
        let plan = fixture();
        let children = refine(&plan);
        assert!(!children.is_empty());
        assert!(children.iter().any(|c| c.causal_links().links().iter().any(|l| l.source == c.init_id())));
    }

    #[test]
    fn tclf_promote_and_demote_each_add_a_distinct_ordering_edge() {
        let plan = fixture();
        let link = CausalLink { source: plan.init_id(), sink: plan.goal_id(), effect: Id(9_999), precondition: Id(9_998) };
        let threat = Id(9_997);
        let children = refine_tclf(&plan, threat, link);
        assert_eq!(children.len(), 2);
        assert!(children[0].ordering().has_path(link.sink, threat));
        assert!(children[1].ordering().has_path(threat, link.source));
    }

    #[test]
    fn ugsv_produces_one_child_per_compatible_constant() {
        let plan = fixture();
        let idgen = plan.idgen().clone();
        let free_var = Argument::new(idgen.next(), "box", "?x", VarKind::Object);
        let mut plan = plan;
        plan.bindings_mut().symbolic.register(&free_var);
        let children = refine_ugsv(&plan, free_var.id());
        assert_eq!(children.len(), 1);
    }
}
