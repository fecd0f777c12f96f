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

//! The before/after relation over plan steps.

use crate::id::Id;
use petgraph::algo::toposort;
use petgraph::prelude::*;
use petgraph::stable_graph::StableGraph;
use std::collections::HashMap;

type IndexType = u32;

/// A directed acyclic graph over step ids. Backed by a [`StableGraph`] so that node indices
/// stay valid as the graph grows (plans never remove steps, only add them).
#[derive(Debug, Clone, Default)]
pub struct OrderingGraph {
    graph: StableGraph<Id, (), Directed, IndexType>,
    index: HashMap<Id, NodeIndex<IndexType>>,
}

impl OrderingGraph {
    /// An empty ordering graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, id: Id) -> NodeIndex<IndexType> {
        *self.index.entry(id).or_insert_with(|| self.graph.add_node(id))
    }

    /// Register a step without any edges (used when a step has no ordering constraints yet).
    pub fn add_node(&mut self, id: Id) {
        self.node(id);
    }

    /// Add the constraint `before < after`. Returns `false` (and does not add the edge) if doing
    /// so would close a cycle.
    pub fn add_edge(&mut self, before: Id, after: Id) -> bool {
        let u = self.node(before);
        let v = self.node(after);
        if u == v {
            return false;
        }
        if self.has_path_idx(v, u) {
            return false;
        }
        self.graph.update_edge(u, v, ());
        true
    }

    /// Whether there is a directed path `from -> ... -> to` (reflexive: `has_path(a, a)` is
    /// `true` when `a` is a known node).
    pub fn has_path(&self, from: Id, to: Id) -> bool {
        match (self.index.get(&from), self.index.get(&to)) {
            (Some(&u), Some(&v)) => u == v || self.has_path_idx(u, v),
            _ => false,
        }
    }

    fn has_path_idx(&self, from: NodeIndex<IndexType>, to: NodeIndex<IndexType>) -> bool {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(n) = stack.pop() {
            if n == to {
                return true;
            }
            if !seen.insert(n) {
                continue;
            }
            for next in self.graph.neighbors_directed(n, Outgoing) {
                stack.push(next);
            }
        }
        false
    }

    /// Direct predecessors of `id`.
    pub fn parents(&self, id: Id) -> Vec<Id> {
        match self.index.get(&id) {
            Some(&n) => self
                .graph
                .neighbors_directed(n, Incoming)
                .map(|p| self.graph[p])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Direct successors of `id`.
    pub fn children(&self, id: Id) -> Vec<Id> {
        match self.index.get(&id) {
            Some(&n) => self
                .graph
                .neighbors_directed(n, Outgoing)
                .map(|c| self.graph[c])
                .collect(),
            None => Vec::new(),
        }
    }

    /// All edges, as `(before, after)` pairs.
    pub fn edges(&self) -> Vec<(Id, Id)> {
        self.graph
            .edge_indices()
            .filter_map(|e| {
                self.graph.edge_endpoints(e).map(|(u, v)| (self.graph[u], self.graph[v]))
            })
            .collect()
    }

    /// A topological order of every registered step, or `None` if the graph has (incorrectly)
    /// become cyclic.
    pub fn topological_sort(&self) -> Option<Vec<Id>> {
        toposort(&self.graph, None).ok().map(|ns| ns.into_iter().map(|n| self.graph[n]).collect())
    }

    /// Acyclicity check. `add_edge` already refuses cycle-closing edges, so this should always
    /// return `true`; callers use it as a final consistency gate before accepting a plan.
    pub fn is_internally_consistent(&self) -> bool {
        self.topological_sort().is_some()
    }
}
