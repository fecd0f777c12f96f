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

//! Grounded conditions (preconditions, effects, goal literals).

use crate::argument::Argument;
use crate::id::Id;

/// The two predicates with planner-visible special meaning.
pub const WITHIN: &str = "within";
/// Kept off the precondition list of the owning [`crate::operator::OperatorSchema`]; extracted
/// into a reach constraint at step-insertion time instead.
pub const IN_REACH: &str = "in_reach";

/// A grounded, possibly-negated predicate instance.
#[derive(Debug, Clone)]
pub struct Literal {
    id: Id,
    name: String,
    args: Vec<Argument>,
    truth: bool,
    is_static: bool,
}

impl Literal {
    /// Construct a new literal.
    pub fn new(id: Id, name: impl Into<String>, args: Vec<Argument>, truth: bool, is_static: bool) -> Self {
        Self { id, name: name.into(), args, truth, is_static }
    }

    /// Stable identity of this grounded literal occurrence.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Predicate name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered argument list.
    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// Polarity: `true` for a positive literal.
    pub fn truth(&self) -> bool {
        self.truth
    }

    /// Whether this predicate ever appears as an effect anywhere in the domain. Statics can only
    /// ever be established by the initial state.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether this is an instance of the distinguished `within(object, area)` predicate.
    pub fn is_within(&self) -> bool {
        self.name == WITHIN
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.truth == other.truth && self.args == other.args
    }
}
impl Eq for Literal {}
