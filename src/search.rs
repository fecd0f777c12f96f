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

//! Best-first plan-space search: pop the lowest-keyed plan off the frontier, refine it, push the
//! children back, repeat until a solution is popped, the frontier empties, or the run is cut off.
//!
//! The search is single-threaded and deterministic: every id in a run comes from one shared
//! [`crate::id::IdGen`], so the frontier's tie-breaking key never depends on scheduling.

use crate::heuristic::Heuristic;
use crate::plan::Plan;
use crate::refine;
use crate::Stopper;
use log::{debug, info, trace, warn};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// Why a search run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The popped plan had no outstanding flaws.
    Solved,
    /// The frontier emptied without ever popping a solved plan.
    Exhausted,
    /// The wall-clock deadline elapsed, or the external stop signal fired, before either of the
    /// above.
    CutOff,
}

/// Summary statistics for one search run, independent of whether it found a solution.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// How the search ended.
    pub termination: Termination,
    /// Wall-clock time spent inside [`search`].
    pub elapsed: Duration,
    /// Number of plans popped from the frontier and handed to [`refine::refine`].
    pub nodes_expanded: u64,
    /// Number of plans ever pushed onto the frontier, including the root.
    pub nodes_visited: u64,
    /// Number of expansions that produced no children at all (dead ends).
    pub leaves_pruned: u64,
}

/// Run best-first search from `root` until a solution is found, the frontier empties, or either
/// `time_limit` or `stopper` calls for a cutoff. `heuristic` is shared across the whole run so
/// its per-predicate memoization pays off across every plan popped.
pub fn search(root: Plan, heuristic: &Heuristic, time_limit: Option<Duration>, mut stopper: Stopper) -> (Option<Plan>, SearchReport) {
    let start = Instant::now();
    let mut nodes_expanded = 0u64;
    let mut leaves_pruned = 0u64;

    let mut root = root;
    root.set_heuristic(heuristic.h_plan(&root));
    let mut nodes_visited = 1u64;

    let mut frontier = BinaryHeap::new();
    frontier.push(Reverse(root));

    loop {
        if let Some(limit) = time_limit {
            if start.elapsed() >= limit {
                info!("search cut off after {} expansions (wall-clock deadline reached)", nodes_expanded);
                return (
                    None,
                    SearchReport { termination: Termination::CutOff, elapsed: start.elapsed(), nodes_expanded, nodes_visited, leaves_pruned },
                );
            }
        }
        if stopper.try_is_stop().unwrap_or(false) {
            info!("search cut off after {} expansions (external stop signal)", nodes_expanded);
            return (
                None,
                SearchReport { termination: Termination::CutOff, elapsed: start.elapsed(), nodes_expanded, nodes_visited, leaves_pruned },
            );
        }

        let plan = match frontier.pop() {
            Some(Reverse(p)) => p,
            None => {
                warn!("frontier exhausted after {} expansions without a solution", nodes_expanded);
                return (
                    None,
                    SearchReport { termination: Termination::Exhausted, elapsed: start.elapsed(), nodes_expanded, nodes_visited, leaves_pruned },
                );
            }
        };

        if plan.is_solved() {
            debug!("solution found at depth {} after {} expansions", plan.depth(), nodes_expanded);
            return (
                Some(plan),
                SearchReport { termination: Termination::Solved, elapsed: start.elapsed(), nodes_expanded, nodes_visited, leaves_pruned },
            );
        }

        nodes_expanded += 1;
        trace!("expanding plan {} (cost {}, heuristic {})", plan.id(), plan.cost(), plan.heuristic());

        let children = refine::refine(&plan);
        if children.is_empty() {
            leaves_pruned += 1;
            continue;
        }
        for mut child in children {
            child.set_heuristic(heuristic.h_plan(&child));
            nodes_visited += 1;
            frontier.push(Reverse(child));
        }
    }
}

#[cfg(test)]
mod test_search {
    use super::*;
    use crate::argument::{Argument, VarKind};
    use crate::bindings::symbolic::TypeOntology;
    use crate::id::IdGen;
    use crate::operator::{LiteralTemplate, OperatorSchema};
    use crate::problem::{Domain, Problem};
    use geo::{LineString, Polygon};
    use std::collections::HashMap;
    use std::rc::Rc;

    fn base_square() -> Polygon<f64> {
        Polygon::new(LineString::from(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (0.0, 0.0)]), vec![])
    }

    #[test]
    fn finds_a_solution_by_adding_a_single_step() {
        let idgen = IdGen::new();
        let obj = Argument::constant(idgen.next(), "box", "boxA", VarKind::Object);
        let schema = OperatorSchema {
            step_num: 0,
            name: "achieve".to_string(),
            params: vec![("box".to_string(), "?x".to_string(), VarKind::Object)],
            preconds: Vec::new(),
            effects: vec![LiteralTemplate::pos("holds", vec![0])],
            nonequals: Vec::new(),
            reach_pairs: Vec::new(),
            dimensions: Vec::new(),
            path_endpoints: Vec::new(),
            instantiable: true,
            height: 0,
            candidate_map: HashMap::new(),
            threat_map: HashMap::new(),
        };
        let domain = Domain { name: "test".into(), schemas: vec![schema], ontology: TypeOntology::flat(vec!["box".into()]) };
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
            init_facts: Vec::new(),
            goal: vec![("holds".to_string(), vec![obj.id()], true)],
        };
        let root = Plan::make_root_plan(&domain, &problem, idgen).unwrap();
        let heuristic = Heuristic::new(Rc::new(crate::operator::OperatorPool::new(domain.schemas.clone())), Vec::new());

        let (solution, report) = search(root, &heuristic, Some(Duration::from_secs(5)), Stopper::new());
        assert_eq!(report.termination, Termination::Solved);
        let mut solution = solution.expect("a solution should have been found");
        assert!(solution.check_plan());
    }

    #[test]
    fn an_unreachable_goal_exhausts_the_frontier() {
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
            init_facts: Vec::new(),
            goal: vec![("holds".to_string(), vec![obj.id()], true)],
        };
        let root = Plan::make_root_plan(&domain, &problem, idgen).unwrap();
        let heuristic = Heuristic::new(Rc::new(crate::operator::OperatorPool::new(Vec::new())), Vec::new());

        let (solution, report) = search(root, &heuristic, Some(Duration::from_secs(2)), Stopper::new());
        assert!(solution.is_none());
        assert_eq!(report.termination, Termination::Exhausted);
    }
}
