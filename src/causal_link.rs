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

//! Causal links: provider step -> consumer step, labelled with the (effect, precondition) pair
//! that justifies the edge.

use crate::id::Id;

/// A single causal link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CausalLink {
    /// Step establishing the condition.
    pub source: Id,
    /// Step requiring the condition.
    pub sink: Id,
    /// The effect literal on `source` that establishes it.
    pub effect: Id,
    /// The precondition literal on `sink` that is established.
    pub precondition: Id,
}

/// The set of causal links in a plan, plus a by-precondition index for threat scans.
#[derive(Debug, Clone, Default)]
pub struct CausalLinkGraph {
    links: Vec<CausalLink>,
}

impl CausalLinkGraph {
    /// An empty causal-link graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new causal link.
    pub fn add_link(&mut self, link: CausalLink) {
        self.links.push(link);
    }

    /// All recorded links.
    pub fn links(&self) -> &[CausalLink] {
        &self.links
    }

    /// The (at most one, by construction) link supporting `sink`'s `precondition`.
    pub fn supporting(&self, sink: Id, precondition: Id) -> Option<&CausalLink> {
        self.links.iter().find(|l| l.sink == sink && l.precondition == precondition)
    }

    /// Every precondition id that is already supported by some link.
    pub fn is_supported(&self, sink: Id, precondition: Id) -> bool {
        self.supporting(sink, precondition).is_some()
    }

    /// Structural consistency: every precondition is supported by at most one link (step
    /// insertion guarantees "at most one" is actually "exactly one" once the precondition stops
    /// being an open-precondition flaw, but a freshly inserted step may legitimately have zero).
    pub fn is_internally_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        for link in &self.links {
            if !seen.insert((link.sink, link.precondition)) {
                return false;
            }
        }
        true
    }
}
