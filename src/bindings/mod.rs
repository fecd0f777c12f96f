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

//! Variable bindings: the symbolic union-find and the geometric placement CSP, plus the
//! `within`-driven glue between them.

pub mod geometric;
pub mod symbolic;

use crate::argument::{Argument, VarKind};
use crate::id::Id;
use crate::literal::{Literal, WITHIN};
use geometric::GeometricBindings;
use std::collections::HashMap;
use symbolic::{TypeOntology, SymbolicBindings};

/// Aggregate facade over the symbolic and geometric bindings, mirroring the way a plan's
/// `within`-linked object/area pairs and reach constraints are threaded through both.
#[derive(Debug, Clone)]
pub struct VariableBindings {
    /// Union-find over object-typed (and constant) variables.
    pub symbolic: SymbolicBindings,
    /// Placement CSP over area- and path-typed variables.
    pub geometric: GeometricBindings,
    /// `reach(area_var) -> robot_var` pairs awaiting the robot's grounding.
    reach_constraints: Vec<(Id, Id)>,
}

impl VariableBindings {
    /// An empty binding set for the given type ontology.
    pub fn new(ontology: TypeOntology) -> Self {
        Self {
            symbolic: SymbolicBindings::new(ontology),
            geometric: GeometricBindings::new(),
            reach_constraints: Vec::new(),
        }
    }

    /// Register every argument of `args` into whichever binding structure its `VarKind` names.
    pub fn register_all(&mut self, args: &[Argument]) {
        for a in args {
            match a.kind() {
                VarKind::Object => self.symbolic.register(a),
                VarKind::Area => self.geometric.register_area(a),
                VarKind::Path => self.geometric.register_path(a),
            }
        }
    }

    /// Link an area variable's owning object, from a `within(object, area)` literal.
    pub fn link_within(&mut self, lit: &Literal) {
        if lit.name() == WITHIN && lit.args().len() == 2 {
            let obj = lit.args()[0].id();
            let area = lit.args()[1].id();
            self.geometric.set_owner(area, obj);
        }
    }

    /// Register a reach constraint directly by argument id.
    pub fn register_reach(&mut self, robot: Id, area: Id) {
        self.reach_constraints.push((area, robot));
        self.apply_reach(robot);
    }

    /// Called whenever a robot variable becomes grounded: unify every area registered against it
    /// with that robot's reach polygon.
    pub fn apply_reach(&mut self, robot: Id) {
        if let Some(robot_name) = self.symbolic.constant_name(robot) {
            let areas: Vec<Id> = self
                .reach_constraints
                .iter()
                .filter(|(_, r)| *r == robot)
                .map(|(a, _)| *a)
                .collect();
            for area in areas {
                self.geometric.constrain_within_named_reach(area, &robot_name);
            }
        }
    }

    /// Unify a provider effect with a consumer precondition: the combined symbolic-equality and
    /// (for `within`) geometric-containment check used by every resolution operator.
    pub fn unify(&mut self, provider: &Literal, consumer: &Literal) -> bool {
        if provider.name() != consumer.name() || provider.truth() != consumer.truth() {
            return false;
        }
        if provider.args().len() != consumer.args().len() {
            return false;
        }
        if provider.name() == WITHIN {
            let p_obj = provider.args()[0].id();
            let c_obj = consumer.args()[0].id();
            let p_area = provider.args()[1].id();
            let c_area = consumer.args()[1].id();
            if !self.symbolic.add_codesignation(p_obj, c_obj) {
                return false;
            }
            if !self.geometric.unify_area(p_area, c_area) {
                return false;
            }
            return true;
        }
        let mut pending: Vec<(Id, Id)> = Vec::new();
        for (p, c) in provider.args().iter().zip(consumer.args().iter()) {
            if p.kind() != VarKind::Object || c.kind() != VarKind::Object {
                // non-object positions compared only by identity
                if p.id() != c.id() {
                    return false;
                }
                continue;
            }
            if !self.symbolic.can_codesignate(p.id(), c.id()) {
                return false;
            }
            pending.push((p.id(), c.id()));
        }
        for (p, c) in pending {
            if !self.symbolic.add_codesignation(p, c) {
                return false;
            }
        }
        true
    }

    /// Every registered reach constraint whose robot is already grounded is satisfied: the
    /// area's assigned polygon, once placed, lies within that robot's named reach region.
    pub fn reach_satisfied(&mut self) -> bool {
        let pairs = self.reach_constraints.clone();
        pairs.into_iter().all(|(area, robot)| match self.symbolic.constant_name(robot) {
            Some(name) => self.geometric.is_within_named(area, &format!("reach:{}", name)),
            None => true,
        })
    }

    /// Snapshot of every grounded area's assigned polygon, keyed by argument id — used by JSON
    /// export.
    pub fn geometric_assignments(&self) -> HashMap<Id, Vec<(f64, f64)>> {
        self.geometric.assignments()
    }

    /// Snapshot of every grounded object's bound constant name, keyed by argument id — used by
    /// JSON export.
    pub fn symbolic_assignments(&mut self) -> HashMap<Id, String> {
        self.symbolic.all_constant_names()
    }
}

#[cfg(test)]
mod test_bindings {
    use super::*;
    use crate::argument::{Argument, VarKind};
    use crate::id::IdGen;

    fn ontology() -> TypeOntology {
        TypeOntology::flat(vec!["robot".into(), "box".into()])
    }

    #[test]
    fn within_unify_links_object_and_area() {
        let idgen = IdGen::new();
        let mut vb = VariableBindings::new(ontology());
        let obj_a = Argument::constant(idgen.next(), "box", "boxA", VarKind::Object);
        let obj_b = Argument::new(idgen.next(), "box", "?b", VarKind::Object);
        let area_a = Argument::new(idgen.next(), "area", "areaA", VarKind::Area);
        let area_b = Argument::new(idgen.next(), "area", "?loc", VarKind::Area);
        vb.symbolic.register(&obj_a);
        vb.symbolic.register(&obj_b);
        vb.geometric.register_area(&area_a);
        vb.geometric.register_area(&area_b);

        let provider = Literal::new(idgen.next(), WITHIN, vec![obj_a.clone(), area_a.clone()], true, false);
        let consumer = Literal::new(idgen.next(), WITHIN, vec![obj_b.clone(), area_b.clone()], true, false);
        assert!(vb.unify(&provider, &consumer));
        assert!(vb.symbolic.is_codesignated(obj_a.id(), obj_b.id()));
    }
}
