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

//! # Poclsolver
//! Wrapper function tying plan construction, the heuristic and the search driver together.

use crate::heuristic::Heuristic;
use crate::id::IdGen;
use crate::operator::OperatorPool;
use crate::plan::Plan;
use crate::problem::{Domain, Problem};
use crate::search::{self, SearchReport};
use crate::{Error, Stopper};

use log::*;
use std::rc::Rc;
use std::time::Duration;

/// # Solve a planning problem
///
/// This is the main function to interact with the system. It builds the root plan, an
/// additive heuristic over `domain`'s operator pool, and runs best-first search until a
/// solution is found, the frontier is exhausted, or `time_limit` elapses.
///
/// The returned `Option<Plan>` is `None` whenever the search does not end in
/// [`search::Termination::Solved`](crate::search::Termination::Solved) — that is not
/// reported as an `Err`, since failing to find a plan is an ordinary, successful outcome of a
/// search. Only inputs that make `domain` and `problem` unplannable at construction time (a
/// missing reach area, an unknown object type, ...) surface as [`Error`].
///
/// ## Usage
///
/// ```
/// use poclsolver::{solve, Stopper};
/// use poclsolver::id::IdGen;
/// use poclsolver::problem::{Domain, Problem};
/// use poclsolver::Error;
///
/// fn main() -> Result<(), Error> {
///     // prepare the domain and problem
///     // let domain = ...
///     // let problem = ...
/// # use poclsolver::argument::{Argument, VarKind};
/// # use poclsolver::bindings::symbolic::TypeOntology;
/// # use std::collections::HashMap;
/// # use geo::{LineString, Polygon};
/// # let idgen = IdGen::new();
/// # let obj = Argument::constant(idgen.next(), "box", "boxA", VarKind::Object);
/// # let domain = Domain { name: "test".into(), schemas: Vec::new(), ontology: TypeOntology::flat(vec!["box".into()]) };
/// # let mut areas = HashMap::new();
/// # areas.insert("base".to_string(), Polygon::new(LineString::from(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (0.0, 0.0)]), vec![]));
/// # let problem = Problem {
/// #     domain: "test".into(),
/// #     objects: vec![obj.clone()],
/// #     object_dimensions: HashMap::new(),
/// #     initial_positions: HashMap::new(),
/// #     areas,
/// #     base_area: "base".into(),
/// #     robot_reach: HashMap::new(),
/// #     init_facts: vec![("holds".to_string(), vec![obj.id()])],
/// #     goal: vec![("holds".to_string(), vec![obj.id()], true)],
/// # };
///
///     let (plan, report) = solve(&domain, &problem, None)?;
///     println!("{:#?}", report);
///     if let Some(plan) = plan {
///         println!("{}", plan.to_json());
///     }
///
///     Ok(())
/// }
/// ```
pub fn solve(domain: &Domain, problem: &Problem, time_limit: Option<Duration>) -> Result<(Option<Plan>, SearchReport), Error> {
    let idgen = IdGen::new();
    let root = Plan::make_root_plan(domain, problem, idgen)?;

    let pool = Rc::new(OperatorPool::new(domain.schemas.clone()));
    let init_facts = problem.init_facts.iter().map(|(name, _)| (name.clone(), true)).collect::<Vec<_>>();
    let heuristic = Heuristic::new(pool, init_facts);

    info!("solving problem `{}` against domain `{}`...", problem.domain, domain.name);

    let (plan, report) = search::search(root, &heuristic, time_limit, Stopper::new());
    match &plan {
        Some(_) => info!("found a solution after {} expansions", report.nodes_expanded),
        None => warn!("no solution found ({:?}) after {} expansions", report.termination, report.nodes_expanded),
    }
    Ok((plan, report))
}

/// # Solve a planning problem, honouring an externally-supplied [`Stopper`]
///
/// Identical to [`solve`], except the caller supplies its own `stopper` so a solve running on
/// a background thread can be cancelled from elsewhere.
pub fn solve_with_stopper(
    domain: &Domain,
    problem: &Problem,
    time_limit: Option<Duration>,
    stopper: Stopper,
) -> Result<(Option<Plan>, SearchReport), Error> {
    let idgen = IdGen::new();
    let root = Plan::make_root_plan(domain, problem, idgen)?;

    let pool = Rc::new(OperatorPool::new(domain.schemas.clone()));
    let init_facts = problem.init_facts.iter().map(|(name, _)| (name.clone(), true)).collect::<Vec<_>>();
    let heuristic = Heuristic::new(pool, init_facts);

    let (plan, report) = search::search(root, &heuristic, time_limit, stopper);
    Ok((plan, report))
}
