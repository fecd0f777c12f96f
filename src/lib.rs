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

#![deny(missing_docs)]

//! # Poclsolver: a partial-order causal-link planner with symbolic and geometric binding
//!
//! This is a library for solving placement-and-manipulation planning problems: given a domain
//! of operator schemas and a problem describing objects, areas and a goal, it searches
//! plan-space for a partially-ordered set of steps, linked by causal links, whose open
//! conditions have all been resolved and whose symbolic and geometric variables have all been
//! grounded to concrete objects and placements.
//!
//! ## Problem statement
//!
//! Given
//! - a [`Domain`](problem::Domain) of parametrized operator schemas with typed preconditions
//!   and effects,
//! - a [`Problem`](problem::Problem) naming the objects, their areas, reach constraints and
//!   initial facts, and a goal condition,
//!
//! find a plan: a set of grounded steps, a partial ordering over them, a set of causal links
//! justifying every precondition, and a binding of every symbolic and geometric variable, such
//! that no flaw remains (see [`flaw`]).
//!
//! ## Structure
//!
//! This library is structured in the following way:
//!
//! - **[`id`]**: Monotonically increasing identifiers, shared across an entire search run via a
//!   single [`IdGen`](id::IdGen) so that two plans derived from the same root never collide.
//! - **[`argument`]**, **[`literal`]**, **[`operator`]**: The vocabulary a domain is written in —
//!   typed variables, literal templates, and operator schemas, plus the grounded [`Step`]s an
//!   instantiated plan is built from.
//! - **[`problem`]**: The static, read-only description of a planning problem: a [`Domain`] and
//!   the objects/areas/goal it is posed against.
//! - **[`bindings`]**: The two binding stores a plan threads through search —
//!   [`SymbolicBindings`](bindings::symbolic::SymbolicBindings) (union-find over object-typed
//!   variables) and [`GeometricBindings`](bindings::geometric::GeometricBindings) (shrinking
//!   max-region polygons and grid-sampled placement/path resolution).
//! - **[`ordering`]**, **[`causal_link`]**: The partial order over a plan's steps and the causal
//!   links justifying its preconditions.
//! - **[`path_planner`]**: Grid-based free-space erosion, A* pathfinding and movable-obstacle
//!   discovery, used by the geometric bindings' path resolution.
//! - **[`flaw`]**: The six-bucket, priority-ordered flaw catalogue a plan reports, and the
//!   flaw-library collection that picks the next one to resolve.
//! - **[`plan`]**: [`Plan`](plan::Plan), the mutable search-space node: steps, ordering, causal
//!   links, bindings and flaws bundled together, with the frontier ordering key in its `Ord`
//!   implementation.
//! - **[`refine`]**: The refinement operators: given a plan's highest-priority flaw, every plan
//!   that resolves it.
//! - **[`heuristic`]**: The frontier's additive open-precondition heuristic.
//! - **[`search`]**: The best-first search driver tying the frontier, the heuristic and
//!   refinement together into one deterministic run.
//!
//! ## Usage
//!
//! Build a [`Domain`](problem::Domain) and a [`Problem`](problem::Problem), then call
//! [`solve`].
//!
//! ```
//! use poclsolver::solve;
//! use poclsolver::Error;
//! use poclsolver::id::IdGen;
//! use poclsolver::problem::{Domain, Problem};
//! # use poclsolver::argument::{Argument, VarKind};
//! # use poclsolver::bindings::symbolic::TypeOntology;
//! # use std::collections::HashMap;
//! # use geo::{LineString, Polygon};
//!
//! fn main() -> Result<(), Error> {
//!     // prepare the domain and problem
//!     // let domain = ...
//!     // let problem = ...
//! # let idgen = IdGen::new();
//! # let obj = Argument::constant(idgen.next(), "box", "boxA", VarKind::Object);
//! # let domain = Domain { name: "test".into(), schemas: Vec::new(), ontology: TypeOntology::flat(vec!["box".into()]) };
//! # let mut areas = HashMap::new();
//! # areas.insert("base".to_string(), Polygon::new(LineString::from(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (0.0, 0.0)]), vec![]));
//! # let problem = Problem {
//! #     domain: "test".into(),
//! #     objects: vec![obj.clone()],
//! #     object_dimensions: HashMap::new(),
//! #     initial_positions: HashMap::new(),
//! #     areas,
//! #     base_area: "base".into(),
//! #     robot_reach: HashMap::new(),
//! #     init_facts: vec![("holds".to_string(), vec![obj.id()])],
//! #     goal: vec![("holds".to_string(), vec![obj.id()], true)],
//! # };
//!
//!     // synthesize a plan
//!     let (plan, report) = solve(&domain, &problem, None)?;
//!
//!     // Do something with the result
//!     println!("{:#?}", report);
//!
//!     Ok(())
//! }
//! ```

pub mod argument;
pub mod bindings;
pub mod causal_link;
mod error;
pub mod flaw;
pub mod heuristic;
pub mod id;
pub mod literal;
pub mod operator;
pub mod ordering;
pub mod path_planner;
pub mod plan;
pub mod problem;
pub mod refine;
pub mod search;

mod synthesize;
pub use synthesize::{solve, solve_with_stopper};

pub use error::Error;

use std::sync::{Arc, RwLock};

/// Stopper, to check when to stop, or to send the stop command
#[derive(Clone, Debug)]
pub struct Stopper {
    b: Arc<RwLock<bool>>,
    c: usize,
}

impl Default for Stopper {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopper {
    /// Create a new stopper
    pub fn new() -> Self {
        Self { b: Arc::new(RwLock::new(false)), c: 0 }
    }

    /// Send the stop command. This function will block until the write lock can be acquired.
    pub fn send_stop(&self) {
        *self.b.write().unwrap() = true;
    }

    /// Checks if the stop flag is set. This funciton will not block, just continue if the
    /// read-lock cannot be acquired.
    pub fn try_is_stop(&mut self) -> Option<bool> {
        self.c += 1;
        if self.c >= 9 {
            self.c = 0;
            self.b.try_read().map(|x| *x).ok()
        } else {
            None
        }
    }

    /// Checks if the stop flag is set. This funciton will block until the read lock can be
    /// acquired.
    pub fn is_stop(&self) -> bool {
        *self.b.read().unwrap()
    }
}
