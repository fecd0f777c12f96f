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

//! Typed argument variables.

use crate::id::Id;
use std::fmt;

/// Which binding structure an argument's value ultimately lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// Resolved through the symbolic (union-find) bindings: robots, boxes, named areas-as-objects.
    Object,
    /// Resolved through the geometric bindings as a placement polygon.
    Area,
    /// Resolved through the geometric bindings as a travelled corridor.
    Path,
}

/// A typed, named variable. Equality and hashing are by [`Id`] alone: two `Argument`s with the
/// same id always denote the same slot, even if `name`/`ty` differ after a merge widens the
/// recorded type.
#[derive(Debug, Clone)]
pub struct Argument {
    id: Id,
    ty: String,
    name: String,
    kind: VarKind,
    /// `true` for arguments that denote a concrete problem object rather than a free variable
    /// (constants are registered pre-bound to themselves in the symbolic bindings).
    is_constant: bool,
}

impl Argument {
    /// Construct a fresh variable argument.
    pub fn new(id: Id, ty: impl Into<String>, name: impl Into<String>, kind: VarKind) -> Self {
        Self { id, ty: ty.into(), name: name.into(), kind, is_constant: false }
    }

    /// Construct a constant (an actual problem object, already grounded to itself).
    pub fn constant(id: Id, ty: impl Into<String>, name: impl Into<String>, kind: VarKind) -> Self {
        Self { id, ty: ty.into(), name: name.into(), kind, is_constant: true }
    }

    /// Stable identity.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Declared type tag.
    pub fn ty(&self) -> &str {
        &self.ty
    }

    /// Display name (for logging and JSON export; not used for equality).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Which binding structure resolves this argument.
    pub fn kind(&self) -> VarKind {
        self.kind
    }

    /// Whether this argument is a grounded problem object rather than a free variable.
    pub fn is_constant(&self) -> bool {
        self.is_constant
    }
}

impl PartialEq for Argument {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Argument {}

impl std::hash::Hash for Argument {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.ty)
    }
}
