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

//! The frontier's additive open-precondition heuristic.
//!
//! Ungrounded-variable and geometric flaws contribute nothing: the heuristic only looks at
//! `Opf`s, estimating each by the cheapest chain of schema effects/preconditions (by predicate
//! name and polarity alone, ignoring argument identity) that could establish it from the initial
//! facts. This is computed once per distinct predicate and memoized for the rest of the search
//! run, since the schema pool never changes.

use crate::flaw::Flaw;
use crate::operator::{LiteralTemplate, OperatorPool};
use crate::plan::Plan;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Clone, Copy)]
enum Entry {
    /// Currently being computed further up the call stack; treated as free to break cycles.
    InProgress,
    Done(f64),
}

/// A memoized additive heuristic over one operator pool and one problem's initial facts.
pub struct Heuristic {
    pool: Rc<OperatorPool>,
    init: HashSet<(String, bool)>,
    cache: RefCell<HashMap<(String, bool), Entry>>,
}

impl Heuristic {
    /// Build a heuristic from the grounded operator pool and the `init` sentinel's established
    /// facts (predicate name and polarity only).
    pub fn new(pool: Rc<OperatorPool>, init_facts: impl IntoIterator<Item = (String, bool)>) -> Self {
        Self { pool, init: init_facts.into_iter().collect(), cache: RefCell::new(HashMap::new()) }
    }

    /// `is_static` short-circuits to `0.0`: a static predicate's truth never changes across a
    /// plan, so once grounded it never needs a supporting step of its own to become true.
    fn h_condition(&self, name: &str, truth: bool, is_static: bool) -> f64 {
        if is_static {
            return 0.0;
        }
        let key = (name.to_string(), truth);
        if let Some(entry) = self.cache.borrow().get(&key) {
            return match entry {
                Entry::InProgress => 0.0,
                Entry::Done(v) => *v,
            };
        }
        if self.init.contains(&key) {
            self.cache.borrow_mut().insert(key, Entry::Done(0.0));
            return 0.0;
        }
        self.cache.borrow_mut().insert(key.clone(), Entry::InProgress);

        let mut best = f64::INFINITY;
        for schema in self.pool.schemas() {
            if !schema.instantiable {
                continue;
            }
            if !schema.effects.iter().any(|e| e.name == key.0 && e.truth == key.1) {
                continue;
            }
            let cost = 1.0 + self.h_step(&schema.preconds);
            if cost < best {
                best = cost;
            }
        }
        self.cache.borrow_mut().insert(key, Entry::Done(best));
        best
    }

    fn h_step(&self, preconds: &[LiteralTemplate]) -> f64 {
        preconds.iter().map(|p| self.h_condition(&p.name, p.truth, p.is_static)).sum()
    }

    /// Sum of `h_condition` over every open-precondition flaw currently in `plan`.
    pub fn h_plan(&self, plan: &Plan) -> f64 {
        plan.flaws()
            .open_precondition_flaws()
            .filter_map(|f| match f {
                Flaw::Opf { consumer, precondition } => plan
                    .step(*consumer)
                    .and_then(|s| s.preconds().iter().find(|p| p.id() == *precondition))
                    .map(|lit| self.h_condition(lit.name(), lit.truth(), lit.is_static())),
                _ => None,
            })
            .sum()
    }
}

#[cfg(test)]
mod test_heuristic {
    use super::*;
    use crate::operator::OperatorSchema;
    use std::collections::HashMap as Map;

    fn schema(name: &str, preconds: Vec<LiteralTemplate>, effects: Vec<LiteralTemplate>) -> OperatorSchema {
        OperatorSchema {
            step_num: 0,
            name: name.to_string(),
            params: Vec::new(),
            preconds,
            effects,
            nonequals: Vec::new(),
            reach_pairs: Vec::new(),
            dimensions: Vec::new(),
            path_endpoints: Vec::new(),
            instantiable: true,
            height: 0,
            candidate_map: Map::new(),
            threat_map: Map::new(),
        }
    }

    #[test]
    fn facts_already_true_in_init_cost_nothing() {
        let pool = Rc::new(OperatorPool::new(Vec::new()));
        let h = Heuristic::new(pool, vec![("holds".to_string(), true)]);
        assert_eq!(h.h_condition("holds", true, false), 0.0);
    }

    #[test]
    fn a_single_zero_precondition_action_costs_one() {
        let pool = Rc::new(OperatorPool::new(vec![schema("pick_up", Vec::new(), vec![LiteralTemplate::pos("holds", vec![])])]));
        let h = Heuristic::new(pool, Vec::new());
        assert_eq!(h.h_condition("holds", true, false), 1.0);
    }

    #[test]
    fn a_mutually_recursive_pair_of_schemas_still_terminates() {
        let pool = Rc::new(OperatorPool::new(vec![
            schema("a", vec![LiteralTemplate::pos("q", vec![])], vec![LiteralTemplate::pos("p", vec![])]),
            schema("b", vec![LiteralTemplate::pos("p", vec![])], vec![LiteralTemplate::pos("q", vec![])]),
        ]));
        let h = Heuristic::new(pool, Vec::new());
        assert!(h.h_condition("p", true, false).is_finite());
    }

    #[test]
    fn an_unreachable_fact_costs_infinity() {
        let pool = Rc::new(OperatorPool::new(Vec::new()));
        let h = Heuristic::new(pool, Vec::new());
        assert!(h.h_condition("unreachable", true, false).is_infinite());
    }

    #[test]
    fn a_static_predicate_costs_nothing_even_when_never_true_in_init() {
        let pool = Rc::new(OperatorPool::new(Vec::new()));
        let h = Heuristic::new(pool, Vec::new());
        assert_eq!(h.h_condition("box_type", true, true), 0.0);
    }
}
