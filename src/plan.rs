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

//! The plan entity: the aggregate of every graph, binding, and flaw that makes up one
//! partially-ordered candidate plan.

use crate::argument::{Argument, VarKind};
use crate::bindings::VariableBindings;
use crate::causal_link::{CausalLink, CausalLinkGraph};
use crate::error::Error;
use crate::flaw::FlawLibrary;
use crate::id::{Id, IdGen};
use crate::literal::{Literal, WITHIN};
use crate::operator::{OperatorPool, Step};
use crate::ordering::OrderingGraph;
use crate::problem::{Domain, Problem};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::rc::Rc;

/// A partially-ordered candidate plan.
#[derive(Debug, Clone)]
pub struct Plan {
    id: Id,
    name: String,
    idgen: IdGen,
    pool: Rc<OperatorPool>,
    domain_name: String,
    problem_name: String,
    steps: Vec<Step>,
    ordering: OrderingGraph,
    causal_links: CausalLinkGraph,
    bindings: VariableBindings,
    flaws: FlawLibrary,
    potential_tclf: Vec<(Id, CausalLink)>,
    init_id: Id,
    goal_id: Id,
    cost: f64,
    heuristic: f64,
    depth: u32,
}

impl Plan {
    /// Build the root plan from a domain and a problem: registers every object, seeds `init`'s
    /// effects and `goal`'s preconditions, and raises one `Opf` per goal literal.
    pub fn make_root_plan(domain: &Domain, problem: &Problem, idgen: IdGen) -> Result<Self, Error> {
        if domain.name != problem.domain {
            return Err(Error::DomainProblemMismatch { domain: domain.name.clone(), problem: problem.domain.clone() });
        }
        for (robot, area_name) in &problem.robot_reach {
            if problem.object(*robot).is_none() {
                return Err(Error::UnknownRobot(format!("{}", robot)));
            }
            if !problem.areas.contains_key(area_name) {
                return Err(Error::UnknownArea(area_name.clone()));
            }
        }
        for (obj_id, area_name) in &problem.initial_positions {
            if !problem.object_dimensions.contains_key(obj_id) {
                let name = problem.object(*obj_id).map(|o| o.name().to_string()).unwrap_or_default();
                return Err(Error::ObjectWithoutDimensions(name));
            }
            if !problem.areas.contains_key(area_name) {
                return Err(Error::UnknownArea(area_name.clone()));
            }
        }

        let pool = Rc::new(OperatorPool::new(domain.schemas.clone()));
        let mut bindings = VariableBindings::new(domain.ontology.clone());

        for (name, poly) in &problem.areas {
            bindings.geometric.set_named_area(name.clone(), poly.clone());
        }
        bindings.geometric.set_base(problem.areas[&problem.base_area].clone());

        bindings.register_all(&problem.objects);
        // A goal literal may reference a named target region directly (e.g. `within(boxA,
        // goal_left)`): any constant Area argument whose name matches a registered named area is
        // constrained to it here, the same way an object's starting position is below, except
        // that a goal target is a constraint on where a step must eventually place something, not
        // an already-resolved placement, so it is left ungrounded.
        for obj in &problem.objects {
            if obj.kind() == VarKind::Area && obj.is_constant() && problem.areas.contains_key(obj.name()) {
                bindings.geometric.within_named(obj.id(), obj.name());
            }
        }
        for (robot, area_name) in &problem.robot_reach {
            let robot_name = problem.object(*robot).unwrap().name().to_string();
            bindings.geometric.set_named_area(format!("reach:{}", robot_name), problem.areas[area_name].clone());
        }

        // Build the `init` sentinel: one `within` effect per initial position, plus declared facts.
        let mut init_effects = Vec::new();
        for (obj_id, area_name) in &problem.initial_positions {
            let obj = problem.object(*obj_id).unwrap().clone();
            let area_arg = Argument::constant(idgen.next(), "area", area_name.clone(), VarKind::Area);
            bindings.geometric.register_area(&area_arg);
            let (w, l) = problem.object_dimensions[obj_id];
            bindings.geometric.set_dimensions(area_arg.id(), w, l);
            bindings.geometric.set_owner(area_arg.id(), *obj_id);
            bindings.geometric.within_named(area_arg.id(), area_name);
            bindings.geometric.resolve(area_arg.id());
            init_effects.push(Literal::new(idgen.next(), WITHIN, vec![obj, area_arg], true, false));
        }
        for (name, args) in &problem.init_facts {
            let lit_args: Vec<Argument> = args.iter().map(|id| problem.object(*id).unwrap().clone()).collect();
            init_effects.push(Literal::new(idgen.next(), name.clone(), lit_args, true, false));
        }
        let init_id = idgen.next();
        let init_step = Step::new_raw(init_id, usize::MAX, "init", Vec::new(), Vec::new(), init_effects, false);

        // Build the `goal` sentinel: one precondition per goal literal.
        let mut goal_preconds = Vec::new();
        for (name, args, truth) in &problem.goal {
            let lit_args: Vec<Argument> = args.iter().map(|id| problem.object(*id).unwrap().clone()).collect();
            goal_preconds.push(Literal::new(idgen.next(), name.clone(), lit_args, *truth, false));
        }
        let goal_id = idgen.next();
        let goal_step = Step::new_raw(goal_id, usize::MAX, "goal", Vec::new(), goal_preconds, Vec::new(), false);

        let mut plan = Self {
            id: idgen.next(),
            name: "root".to_string(),
            idgen,
            pool,
            domain_name: domain.name.clone(),
            problem_name: problem.domain.clone(),
            steps: Vec::new(),
            ordering: OrderingGraph::new(),
            causal_links: CausalLinkGraph::new(),
            bindings,
            flaws: FlawLibrary::new(),
            potential_tclf: Vec::new(),
            init_id,
            goal_id,
            cost: 0.0,
            heuristic: 0.0,
            depth: 0,
        };

        plan.steps.push(init_step);
        plan.ordering.add_node(init_id);
        plan.steps.push(goal_step);
        plan.ordering.add_node(goal_id);
        plan.ordering.add_edge(init_id, goal_id);

        // Seed one Opf per goal literal.
        let goal_preconds: Vec<(Id, bool)> = plan.goal_step().preconds().iter().map(|p| (p.id(), p.is_static())).collect();
        for (precond_id, is_static) in goal_preconds {
            let in_init = plan.literal_in_init(precond_id);
            let risks = plan.risk_count(precond_id);
            let cndts = plan.candidate_count(precond_id);
            plan.flaws.insert_opf(goal_id, precond_id, is_static, in_init, risks, cndts);
        }

        Ok(plan)
    }

    /// Deep-clone this plan into a fresh branch with a new plan id; argument/literal/step ids
    /// are *not* regenerated (the shared [`IdGen`] is only advanced for genuinely new content).
    pub fn instantiate(&self, suffix: &str) -> Self {
        let mut clone = self.clone();
        clone.id = self.idgen.next();
        clone.name = format!("{}-{}", self.name, suffix);
        clone.depth += 1;
        clone
    }

    /// Stable plan identity.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Human-readable name, extended with a suffix on every branch.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared id allocator (used by refinement operators to instantiate new steps).
    pub fn idgen(&self) -> &IdGen {
        &self.idgen
    }

    /// The grounded operator pool this plan's steps are instantiated from.
    pub fn pool(&self) -> &OperatorPool {
        &self.pool
    }

    /// Search depth (root is 0).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Accumulated cost.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Cached heuristic value.
    pub fn heuristic(&self) -> f64 {
        self.heuristic
    }

    /// Set the cached heuristic (computed externally by `crate::heuristic`).
    pub fn set_heuristic(&mut self, h: f64) {
        self.heuristic = h;
    }

    /// Add to the accumulated cost.
    pub fn add_cost(&mut self, delta: f64) {
        self.cost += delta;
    }

    /// All steps, including the `init`/`goal` sentinels.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Mutable access to a step by id.
    pub fn step_mut(&mut self, id: Id) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.id() == id)
    }

    /// Immutable access to a step by id.
    pub fn step(&self, id: Id) -> Option<&Step> {
        self.steps.iter().find(|s| s.id() == id)
    }

    /// The `init` sentinel.
    pub fn init_step(&self) -> &Step {
        self.step(self.init_id).unwrap()
    }

    /// The `goal` sentinel.
    pub fn goal_step(&self) -> &Step {
        self.step(self.goal_id).unwrap()
    }

    /// Id of the `init` sentinel.
    pub fn init_id(&self) -> Id {
        self.init_id
    }

    /// Id of the `goal` sentinel.
    pub fn goal_id(&self) -> Id {
        self.goal_id
    }

    /// The ordering DAG.
    pub fn ordering(&self) -> &OrderingGraph {
        &self.ordering
    }

    /// Mutable access to the ordering DAG (used by refinement operators to promote/demote).
    pub fn ordering_mut(&mut self) -> &mut OrderingGraph {
        &mut self.ordering
    }

    /// The causal-link graph.
    pub fn causal_links(&self) -> &CausalLinkGraph {
        &self.causal_links
    }

    /// The variable bindings (symbolic + geometric).
    pub fn bindings(&self) -> &VariableBindings {
        &self.bindings
    }

    /// Mutable access to the variable bindings.
    pub fn bindings_mut(&mut self) -> &mut VariableBindings {
        &mut self.bindings
    }

    /// The flaw library.
    pub fn flaws(&self) -> &FlawLibrary {
        &self.flaws
    }

    /// Mutable access to the flaw library.
    pub fn flaws_mut(&mut self) -> &mut FlawLibrary {
        &mut self.flaws
    }

    /// Deferred threats awaiting full argument grounding before they are promoted to real
    /// `Flaw::Tclf`s.
    pub fn potential_tclf(&self) -> &[(Id, CausalLink)] {
        &self.potential_tclf
    }

    /// Drop every deferred potential threat, used once they have all been promoted to real
    /// `Flaw::Tclf`s.
    pub fn clear_potential_tclf(&mut self) {
        self.potential_tclf.clear();
    }

    /// A plan with no outstanding flaws is a solution.
    pub fn is_solved(&self) -> bool {
        self.flaws.is_empty()
    }

    fn literal_in_init(&self, literal_id: Id) -> bool {
        let precond = match self.steps.iter().flat_map(|s| s.preconds()).find(|l| l.id() == literal_id) {
            Some(p) => p,
            None => return false,
        };
        self.init_step().effects().iter().any(|e| e == precond)
    }

    fn candidate_count(&self, precond_id: Id) -> usize {
        let precond = match self.steps.iter().flat_map(|s| s.preconds()).find(|l| l.id() == precond_id) {
            Some(p) => p,
            None => return 0,
        };
        self.steps
            .iter()
            .filter(|s| s.id() != self.goal_id)
            .flat_map(|s| s.effects())
            .filter(|e| e.name() == precond.name() && e.truth() == precond.truth())
            .count()
    }

    /// Number of already-present steps whose effects negate `precond_id`'s predicate — any one of
    /// them would threaten a causal link a candidate provider is about to be linked by, so this
    /// precondition is routed to the `unsafe` bucket rather than `reusable`/`nonreusable`.
    fn risk_count(&self, precond_id: Id) -> usize {
        let precond = match self.steps.iter().flat_map(|s| s.preconds()).find(|l| l.id() == precond_id) {
            Some(p) => p,
            None => return 0,
        };
        self.steps
            .iter()
            .filter(|s| s.id() != self.goal_id)
            .flat_map(|s| s.effects())
            .filter(|e| e.name() == precond.name() && e.truth() != precond.truth())
            .count()
    }

    /// Insert a freshly-instantiated primitive step into the plan: register arguments, link
    /// `within` areas, add non-codesignations, register reach constraints, raise one Opf per
    /// open precondition, raise ungrounded-variable flaws, and enqueue potential threats against
    /// existing causal links.
    pub fn insert_primitive(&mut self, step: Step) -> Id {
        let step_id = step.id();
        trace!("inserting step {} ({})", step_id, step.name());
        self.ordering.add_node(step_id);
        self.ordering.add_edge(self.init_id, step_id);
        self.ordering.add_edge(step_id, self.goal_id);

        self.bindings.register_all(step.args());
        for lit in step.preconds().iter().chain(step.effects().iter()) {
            if lit.name() == WITHIN {
                self.bindings.link_within(lit);
            }
        }
        for &(area_idx, robot_idx) in step.reach_pairs() {
            let args = step.args();
            self.bindings.register_reach(args[robot_idx].id(), args[area_idx].id());
        }
        for &(idx, width, length) in step.dimensions() {
            let args = step.args();
            if args[idx].kind() == VarKind::Area {
                self.bindings.geometric.set_dimensions(args[idx].id(), width, length);
            }
        }
        for &(path_idx, from_idx, to_idx) in step.path_endpoints() {
            let args = step.args();
            let (path_id, from_id, to_id) = (args[path_idx].id(), args[from_idx].id(), args[to_idx].id());
            let (width, length) = step.dimensions().iter().find(|(i, _, _)| *i == path_idx).map(|&(_, w, l)| (w, l)).unwrap_or((0.0, 0.0));
            // Only the endpoints themselves are wired here: the path's free space is the
            // workspace base by default, further narrowed only by explicit disjunctions against
            // obstacles, not by the intersection of its two endpoint placements (which would
            // always be empty for any two disjoint placements).
            self.bindings.geometric.set_path_endpoints(path_id, from_id, to_id, width, length);
        }
        for &(a, b) in step.nonequals() {
            let args = step.args();
            self.bindings.symbolic.add_non_codesignation(args[a].id(), args[b].id());
        }

        let open: Vec<(Id, bool)> = step.preconds().iter().map(|p| (p.id(), p.is_static())).collect();
        for arg in step.args() {
            match arg.kind() {
                VarKind::Object if !arg.is_constant() => self.flaws.insert_ugsv(arg.id()),
                VarKind::Area => self.flaws.insert_uggv(arg.id()),
                VarKind::Path => self.flaws.insert_ugpv(arg.id()),
                _ => {}
            }
        }

        self.steps.push(step);

        for (precond_id, is_static) in open {
            let in_init = self.literal_in_init(precond_id);
            let risks = self.risk_count(precond_id);
            let cndts = self.candidate_count(precond_id);
            self.flaws.insert_opf(step_id, precond_id, is_static, in_init, risks, cndts);
        }

        self.scan_potential_threats_for_new_step(step_id);
        step_id
    }

    /// Check whether the just-inserted step threatens any already-existing causal link, using
    /// the sink schema's precomputed `threat_map`.
    fn scan_potential_threats_for_new_step(&mut self, new_step: Id) {
        let new_step_num = match self.step(new_step) {
            Some(s) => s.step_num(),
            None => return,
        };
        let mut found = Vec::new();
        for link in self.causal_links.links().to_vec() {
            let sink_step = match self.step(link.sink) {
                Some(s) => s,
                None => continue,
            };
            let precond_index = match sink_step.preconds().iter().position(|p| p.id() == link.precondition) {
                Some(i) => i,
                None => continue,
            };
            let threatens = self
                .pool
                .schemas()
                .get(sink_step.step_num())
                .and_then(|schema| schema.threat_map.get(&precond_index))
                .map(|threateners| threateners.iter().any(|(n, _)| *n == new_step_num))
                .unwrap_or(false);
            if !threatens {
                continue;
            }
            if self.ordering.has_path(new_step, link.source) || self.ordering.has_path(link.sink, new_step) {
                continue;
            }
            found.push(link);
        }
        for link in found {
            self.potential_tclf.push((new_step, link));
        }
    }

    /// Fulfil `precond` on `consumer` using `provider`'s `effect`, adding the ordering edge and
    /// causal link, and re-scanning for newly-potential threats on the new link using
    /// `consumer`'s schema `threat_map`.
    pub fn resolve_with_primitive(&mut self, provider: Id, consumer: Id, effect: Id, precond: Id) -> bool {
        if let Some(c) = self.step_mut(consumer) {
            let lit = c.preconds().iter().find(|p| p.id() == precond).cloned();
            if let Some(lit) = lit {
                c.fulfill(&lit);
            }
        }
        if !self.ordering.add_edge(provider, consumer) {
            return false;
        }
        let link = CausalLink { source: provider, sink: consumer, effect, precondition: precond };
        self.causal_links.add_link(link);

        let consumer_info = self.step(consumer).and_then(|c| c.preconds().iter().position(|p| p.id() == precond).map(|idx| (idx, c.step_num())));
        if let Some((precond_index, consumer_step_num)) = consumer_info {
            let threateners: Vec<usize> = self
                .pool
                .schemas()
                .get(consumer_step_num)
                .and_then(|schema| schema.threat_map.get(&precond_index))
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|(step_num, _)| step_num)
                .collect();
            for step in self.steps.clone() {
                if step.id() == provider || step.id() == consumer {
                    continue;
                }
                if !threateners.contains(&step.step_num()) {
                    continue;
                }
                if self.ordering.has_path(step.id(), provider) || self.ordering.has_path(consumer, step.id()) {
                    continue;
                }
                self.potential_tclf.push((step.id(), link));
            }
        }
        debug!("resolved precondition {} on step {} via step {}", precond, consumer, provider);
        true
    }

    /// Whether the ordering and causal-link graphs are both internally consistent.
    pub fn is_internally_consistent(&self) -> bool {
        self.ordering.is_internally_consistent() && self.causal_links.is_internally_consistent()
    }

    /// Whether `a` and `b` denote the same fact under the current bindings: same predicate name,
    /// opposite truth, and every corresponding object-kind argument codesignated (for `within`,
    /// both the placed object and geometric overlap of the two areas).
    fn literals_conflict(&mut self, a: &Literal, b: &Literal) -> bool {
        if a.name() != b.name() || a.truth() == b.truth() || a.args().len() != b.args().len() {
            return false;
        }
        if a.name() == WITHIN && a.args().len() == 2 {
            let obj_a = a.args()[0].id();
            let obj_b = b.args()[0].id();
            let area_a = a.args()[1].id();
            let area_b = b.args()[1].id();
            return self.bindings.symbolic.is_codesignated(obj_a, obj_b) && self.bindings.geometric.areas_overlap(area_a, area_b);
        }
        for (pa, pb) in a.args().iter().zip(b.args().iter()) {
            if pa.kind() != VarKind::Object || pb.kind() != VarKind::Object {
                if pa.id() != pb.id() {
                    return false;
                }
                continue;
            }
            if !self.bindings.symbolic.is_codesignated(pa.id(), pb.id()) {
                return false;
            }
        }
        true
    }

    /// Every causal link must be unthreatened: no other step, unordered with respect to the
    /// link, may have an effect that actually conflicts with the linked literal (not merely one
    /// that shares its predicate name, as the search-time `threat_map` approximates).
    fn causal_links_unthreatened(&mut self) -> bool {
        for link in self.causal_links.links().to_vec() {
            let literal = match self.step(link.source).and_then(|s| s.effects().iter().find(|e| e.id() == link.effect)) {
                Some(l) => l.clone(),
                None => continue,
            };
            for step in self.steps.clone() {
                if step.id() == link.source || step.id() == link.sink {
                    continue;
                }
                for eff in step.effects() {
                    if !self.literals_conflict(&literal, eff) {
                        continue;
                    }
                    if self.ordering.has_path(step.id(), link.source) || self.ordering.has_path(link.sink, step.id()) {
                        continue;
                    }
                    return false;
                }
            }
        }
        true
    }

    /// Every assigned area must be large enough for the object it places.
    fn geometric_placements_valid(&self) -> bool {
        self.bindings.geometric.assigned_areas().all(|(id, _)| self.bindings.geometric.fits_dimensions(id))
    }

    /// No two assigned areas belonging to different owners, not declared disjoint and not
    /// explicitly constrained one within the other, may overlap.
    fn pairwise_overlaps_valid(&self) -> bool {
        let areas = self.bindings.geometric.assigned_area_polygons();
        for i in 0..areas.len() {
            for j in (i + 1)..areas.len() {
                let (a, _) = areas[i];
                let (b, _) = areas[j];
                let geo = &self.bindings.geometric;
                if geo.is_disjunct(a, b) || geo.is_constrained_within(a, b) || geo.is_constrained_within(b, a) {
                    continue;
                }
                let owner_a = geo.owner(a);
                let owner_b = geo.owner(b);
                if owner_a.is_some() && owner_a == owner_b {
                    continue;
                }
                if geo.areas_overlap(a, b) {
                    return false;
                }
            }
        }
        true
    }

    /// A total order must exist (the ordering graph is already acyclic by construction) and
    /// every already-resolved path corridor must still be collision-free against every
    /// un-disjoined assigned area.
    fn executable_order_exists(&self) -> bool {
        self.ordering.topological_sort().is_some() && self.bindings.geometric.corridors_collision_free()
    }

    /// The full validity predicate: every invariant in the testable-properties list at once.
    /// Takes `&mut self` because the union-find underlying codesignation and reach checks needs
    /// path compression to answer `is_codesignated`/`constant_name` queries.
    pub fn check_plan(&mut self) -> bool {
        if !self.is_internally_consistent() {
            return false;
        }
        if !self.flaws.is_empty() {
            return false;
        }
        for link in self.causal_links.links().to_vec() {
            if !self.ordering.has_path(link.source, link.sink) {
                return false;
            }
        }
        if !self.causal_links_unthreatened() {
            return false;
        }
        if !self.geometric_placements_valid() {
            return false;
        }
        if !self.bindings.reach_satisfied() {
            return false;
        }
        if !self.pairwise_overlaps_valid() {
            return false;
        }
        if !self.executable_order_exists() {
            return false;
        }
        true
    }

    /// Serialize to the plan-output JSON schema.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(PlanJson::from_plan(self)).expect("plan json is always representable")
    }
}

// --- JSON schema -----------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct ArgJson {
    id: u64,
    ty: String,
    name: String,
    kind: String,
    is_constant: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct LiteralJson {
    id: u64,
    name: String,
    args: Vec<u64>,
    truth: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct StepJson {
    id: u64,
    schema: String,
    args: Vec<ArgJson>,
    preconds: Vec<LiteralJson>,
    effects: Vec<LiteralJson>,
    stepnum: usize,
    height: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct OrderingJson {
    source: u64,
    sink: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct CausalLinkJson {
    source: u64,
    sink: u64,
    effect: u64,
    precondition: u64,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct BindingsJson {
    // `BTreeMap`, not `HashMap`: serialized key order must be deterministic across processes,
    // not just within one (a `HashMap`'s default hasher is randomized per process).
    geometric: std::collections::BTreeMap<String, Vec<(f64, f64)>>,
    symbolic: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PlanJson {
    id: u64,
    name: String,
    domain: String,
    problem: String,
    solved: bool,
    cost: f64,
    heuristic: f64,
    depth: u32,
    steps: Vec<StepJson>,
    orderings: Vec<OrderingJson>,
    causal_links: Vec<CausalLinkJson>,
    #[serde(rename = "variableBindings")]
    variable_bindings: BindingsJson,
}

fn kind_name(k: VarKind) -> &'static str {
    match k {
        VarKind::Object => "object",
        VarKind::Area => "area",
        VarKind::Path => "path",
    }
}

fn arg_to_json(a: &Argument) -> ArgJson {
    ArgJson { id: a.id().0, ty: a.ty().to_string(), name: a.name().to_string(), kind: kind_name(a.kind()).to_string(), is_constant: a.is_constant() }
}

fn lit_to_json(l: &Literal) -> LiteralJson {
    LiteralJson { id: l.id().0, name: l.name().to_string(), args: l.args().iter().map(|a| a.id().0).collect(), truth: l.truth() }
}

impl PlanJson {
    fn from_plan(plan: &Plan) -> Self {
        let steps = plan
            .steps
            .iter()
            .map(|s| StepJson {
                id: s.id().0,
                schema: s.name().to_string(),
                args: s.args().iter().map(arg_to_json).collect(),
                preconds: s.preconds().iter().map(lit_to_json).collect(),
                effects: s.effects().iter().map(lit_to_json).collect(),
                stepnum: s.step_num(),
                height: s.height(),
            })
            .collect();
        let orderings = plan.ordering.edges().into_iter().map(|(source, sink)| OrderingJson { source: source.0, sink: sink.0 }).collect();
        let causal_links = plan
            .causal_links
            .links()
            .iter()
            .map(|l| CausalLinkJson { source: l.source.0, sink: l.sink.0, effect: l.effect.0, precondition: l.precondition.0 })
            .collect();
        let geometric = plan.bindings.geometric_assignments().into_iter().map(|(id, coords)| (id.0.to_string(), coords)).collect();
        let mut bindings_snapshot = plan.bindings.clone();
        let symbolic = bindings_snapshot.symbolic_assignments().into_iter().map(|(id, name)| (id.0.to_string(), name)).collect();
        PlanJson {
            id: plan.id.0,
            name: plan.name.clone(),
            domain: plan.domain_name.clone(),
            problem: plan.problem_name.clone(),
            solved: plan.is_solved(),
            cost: plan.cost,
            heuristic: plan.heuristic,
            depth: plan.depth,
            steps,
            orderings,
            causal_links,
            variable_bindings: BindingsJson { geometric, symbolic },
        }
    }
}

impl PartialEq for Plan {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Plan {}

impl PartialOrd for Plan {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Plan {
    /// Frontier ordering: `(cost + heuristic, cost, heuristic, flaw count, -causal links,
    /// -orderings, sum of stepnums)`, all ascending except the two negated link/ordering counts
    /// (more structure already committed is preferred at equal cost).
    fn cmp(&self, other: &Self) -> Ordering {
        let key = |p: &Plan| {
            (
                p.cost + p.heuristic,
                p.cost,
                p.heuristic,
                p.flaws.len() as i64,
                -(p.causal_links.links().len() as i64),
                -(p.ordering.edges().len() as i64),
                p.steps.iter().map(|s| s.step_num() as i64).sum::<i64>(),
            )
        };
        let (a, b) = (key(self), key(other));
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .then(a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal))
            .then(a.3.cmp(&b.3))
            .then(a.4.cmp(&b.4))
            .then(a.5.cmp(&b.5))
            .then(a.6.cmp(&b.6))
    }
}
