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

//! Union-find over object-typed variables, with a mutual-exclusion set and a type ontology.

use crate::argument::Argument;
use crate::id::Id;
use std::collections::{HashMap, HashSet};

/// Reflexive-transitive subtype closure, precomputed by the (out of scope) loader.
#[derive(Debug, Clone, Default)]
pub struct TypeOntology {
    /// `type -> every type it is compatible with` (itself, ancestors and descendants).
    closure: HashMap<String, HashSet<String>>,
}

impl TypeOntology {
    /// Build an ontology from an explicit `type -> compatible types` map.
    pub fn new(closure: HashMap<String, HashSet<String>>) -> Self {
        Self { closure }
    }

    /// A flat ontology in which every type is compatible only with itself (used by tests and by
    /// any domain that declares no subtyping).
    pub fn flat(types: Vec<String>) -> Self {
        let mut closure = HashMap::new();
        for t in types {
            let mut set = HashSet::new();
            set.insert(t.clone());
            closure.insert(t, set);
        }
        Self { closure }
    }

    /// Whether `a` and `b` may denote the same object.
    pub fn compatible(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        self.closure.get(a).map(|s| s.contains(b)).unwrap_or(false)
            || self.closure.get(b).map(|s| s.contains(a)).unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
struct Group {
    ty: String,
    constant: Option<Id>,
    members: HashSet<Id>,
    excluded: HashSet<Id>,
}

/// Disjoint-set structure over object-typed variables.
#[derive(Debug, Clone)]
pub struct SymbolicBindings {
    ontology: TypeOntology,
    parent: HashMap<Id, Id>,
    groups: HashMap<Id, Group>,
    args: HashMap<Id, Argument>,
}

impl SymbolicBindings {
    /// An empty binding set.
    pub fn new(ontology: TypeOntology) -> Self {
        Self { ontology, parent: HashMap::new(), groups: HashMap::new(), args: HashMap::new() }
    }

    /// Register a variable (idempotent). Constants are auto-bound to themselves and mutually
    /// excluded from every other already-registered constant (invariant I1).
    pub fn register(&mut self, arg: &Argument) {
        let id = arg.id();
        if self.parent.contains_key(&id) {
            return;
        }
        self.parent.insert(id, id);
        self.args.insert(id, arg.clone());
        let mut members = HashSet::new();
        members.insert(id);
        let constant = if arg.is_constant() { Some(id) } else { None };
        self.groups.insert(id, Group { ty: arg.ty().to_string(), constant, members, excluded: HashSet::new() });

        if arg.is_constant() {
            let other_constant_roots: Vec<Id> = self
                .groups
                .iter()
                .filter(|(root, g)| **root != id && g.constant.is_some())
                .map(|(root, _)| *root)
                .collect();
            for other in other_constant_roots {
                self.groups.get_mut(&id).unwrap().excluded.insert(other);
                self.groups.get_mut(&other).unwrap().excluded.insert(id);
            }
        }
    }

    /// Find the representative of `id`'s group, with path compression.
    pub fn find(&mut self, id: Id) -> Id {
        let mut path = Vec::new();
        let mut cur = id;
        while let Some(&p) = self.parent.get(&cur) {
            if p == cur {
                break;
            }
            path.push(cur);
            cur = p;
        }
        for n in path {
            self.parent.insert(n, cur);
        }
        cur
    }

    /// Whether `a` and `b` are already in the same group.
    pub fn is_codesignated(&mut self, a: Id, b: Id) -> bool {
        self.find(a) == self.find(b)
    }

    /// Whether a merge of `a`'s and `b`'s groups is permitted.
    pub fn can_codesignate(&mut self, a: Id, b: Id) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return true;
        }
        let ga = &self.groups[&ra];
        let gb = &self.groups[&rb];
        if ga.excluded.contains(&rb) || gb.excluded.contains(&ra) {
            return false;
        }
        if let (Some(ca), Some(cb)) = (ga.constant, gb.constant) {
            if ca != cb {
                return false;
            }
        }
        self.ontology.compatible(&ga.ty, &gb.ty)
    }

    /// Merge `a`'s and `b`'s groups (smaller into larger). Returns `false` if `can_codesignate`
    /// would return `false`; idempotent when the groups already coincide.
    pub fn add_codesignation(&mut self, a: Id, b: Id) -> bool {
        if !self.can_codesignate(a, b) {
            return false;
        }
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return true;
        }

        let (survivor, absorbed) = if self.groups[&ra].members.len() >= self.groups[&rb].members.len() {
            (ra, rb)
        } else {
            (rb, ra)
        };

        let absorbed_group = self.groups.remove(&absorbed).unwrap();
        for m in &absorbed_group.members {
            self.parent.insert(*m, survivor);
        }
        // Redirect every other group's exclusion of `absorbed` onto `survivor`.
        for g in self.groups.values_mut() {
            if g.excluded.remove(&absorbed) {
                g.excluded.insert(survivor);
            }
        }
        let survivor_group = self.groups.get_mut(&survivor).unwrap();
        survivor_group.members.extend(absorbed_group.members);
        survivor_group.excluded.extend(absorbed_group.excluded);
        survivor_group.excluded.remove(&survivor);
        if survivor_group.constant.is_none() {
            survivor_group.constant = absorbed_group.constant;
        }
        if absorbed_group.constant.is_some() {
            survivor_group.ty = absorbed_group.ty;
        }
        self.parent.insert(survivor, survivor);
        true
    }

    /// Record that `a` and `b` may never co-designate. Returns `false` if they already do.
    pub fn add_non_codesignation(&mut self, a: Id, b: Id) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        self.groups.get_mut(&ra).unwrap().excluded.insert(rb);
        self.groups.get_mut(&rb).unwrap().excluded.insert(ra);
        true
    }

    /// Whether `id`'s group is fully grounded to a constant.
    pub fn is_grounded(&mut self, id: Id) -> bool {
        let r = self.find(id);
        self.groups[&r].constant.is_some()
    }

    /// The display name of the constant bound to `id`'s group, if grounded.
    pub fn constant_name(&mut self, id: Id) -> Option<String> {
        let r = self.find(id);
        self.groups[&r].constant.and_then(|c| self.args.get(&c)).map(|a| a.name().to_string())
    }

    /// The constant argument id bound to `id`'s group, if grounded.
    pub fn constant_id(&mut self, id: Id) -> Option<Id> {
        let r = self.find(id);
        self.groups[&r].constant
    }

    /// Every registered variable's bound constant name, restricted to groups that are already
    /// grounded — used by JSON export.
    pub fn all_constant_names(&mut self) -> HashMap<Id, String> {
        let ids: Vec<Id> = self.parent.keys().copied().collect();
        let mut out = HashMap::new();
        for id in ids {
            if let Some(name) = self.constant_name(id) {
                out.insert(id, name);
            }
        }
        out
    }

    /// Every distinct constant registered so far, in a deterministic (ascending id) order, used
    /// by the `Add codesignation` refinement to enumerate candidate objects for an ungrounded
    /// variable. Sorted explicitly since group iteration order is a `HashMap`'s, which is not
    /// stable across runs.
    pub fn constant_ids(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.groups.values().filter_map(|g| g.constant).collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod test_symbolic {
    use super::*;
    use crate::argument::VarKind;
    use crate::id::IdGen;

    fn ontology() -> TypeOntology {
        TypeOntology::flat(vec!["box".into(), "robot".into()])
    }

    #[test]
    fn constants_are_mutually_excluded() {
        let idgen = IdGen::new();
        let mut sb = SymbolicBindings::new(ontology());
        let a = Argument::constant(idgen.next(), "box", "boxA", VarKind::Object);
        let b = Argument::constant(idgen.next(), "box", "boxB", VarKind::Object);
        sb.register(&a);
        sb.register(&b);
        assert!(!sb.can_codesignate(a.id(), b.id()));
        assert!(!sb.add_codesignation(a.id(), b.id()));
    }

    #[test]
    fn merges_smaller_into_larger_and_stays_transitive() {
        let idgen = IdGen::new();
        let mut sb = SymbolicBindings::new(ontology());
        let v1 = Argument::new(idgen.next(), "box", "?x", VarKind::Object);
        let v2 = Argument::new(idgen.next(), "box", "?y", VarKind::Object);
        let v3 = Argument::new(idgen.next(), "box", "?z", VarKind::Object);
        sb.register(&v1);
        sb.register(&v2);
        sb.register(&v3);
        assert!(sb.add_codesignation(v1.id(), v2.id()));
        assert!(sb.add_codesignation(v2.id(), v3.id()));
        assert!(sb.is_codesignated(v1.id(), v3.id()));
    }

    #[test]
    fn non_codesignation_blocks_future_merge() {
        let idgen = IdGen::new();
        let mut sb = SymbolicBindings::new(ontology());
        let v1 = Argument::new(idgen.next(), "box", "?x", VarKind::Object);
        let v2 = Argument::new(idgen.next(), "box", "?y", VarKind::Object);
        sb.register(&v1);
        sb.register(&v2);
        assert!(sb.add_non_codesignation(v1.id(), v2.id()));
        assert!(!sb.can_codesignate(v1.id(), v2.id()));
    }

    #[test]
    fn add_codesignation_is_idempotent() {
        let idgen = IdGen::new();
        let mut sb = SymbolicBindings::new(ontology());
        let v1 = Argument::new(idgen.next(), "box", "?x", VarKind::Object);
        let v2 = Argument::new(idgen.next(), "box", "?y", VarKind::Object);
        sb.register(&v1);
        sb.register(&v2);
        assert!(sb.add_codesignation(v1.id(), v2.id()));
        assert!(sb.add_codesignation(v1.id(), v2.id()));
    }
}
