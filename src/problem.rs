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

//! The external contract: types describing a grounded domain and a concrete problem.
//!
//! Everything in this module is data only. The loader that turns on-disk domain/problem
//! descriptions into these types — and the compiler that fills in [`OperatorSchema`]'s
//! candidate/threat maps — are both out of scope; test fixtures build these values by hand.

use crate::argument::Argument;
use crate::bindings::symbolic::TypeOntology;
use crate::id::Id;
use crate::operator::OperatorSchema;
use geo::Polygon;
use std::collections::HashMap;

/// A grounded, reusable action-schema pool plus the type ontology it was compiled against.
#[derive(Debug, Clone)]
pub struct Domain {
    /// Domain name; must match [`Problem::domain`].
    pub name: String,
    /// Instantiable action schemas (the `init`/`goal` sentinels live on [`Problem`] instead,
    /// since they are specific to one problem rather than reusable).
    pub schemas: Vec<OperatorSchema>,
    /// Subtype closure for every symbolic type in this domain.
    pub ontology: TypeOntology,
}

/// A concrete planning problem: objects, their dimensions and starting positions, the
/// workspace's named areas, and the goal.
#[derive(Debug, Clone)]
pub struct Problem {
    /// Domain name this problem was written against; must equal [`Domain::name`].
    pub domain: String,
    /// Every object in the world, each a constant [`Argument`].
    pub objects: Vec<Argument>,
    /// `object id -> (width, length)` in metres, for every object of a placeable type.
    pub object_dimensions: HashMap<Id, (f64, f64)>,
    /// `object id -> starting area name`.
    pub initial_positions: HashMap<Id, String>,
    /// Every named region of the workspace, including robot reach regions (named
    /// `"reach:<robot-name>"`) and the base area.
    pub areas: HashMap<String, Polygon<f64>>,
    /// Name of the workspace's outer boundary, present in `areas`.
    pub base_area: String,
    /// `robot object id -> reach area name`.
    pub robot_reach: HashMap<Id, String>,
    /// Initial-state positive literals beyond `within` (e.g. any static facts).
    pub init_facts: Vec<(String, Vec<Id>)>,
    /// Goal literals, as `(predicate, args, truth)`.
    pub goal: Vec<(String, Vec<Id>, bool)>,
}

impl Problem {
    /// Look up an object by id.
    pub fn object(&self, id: Id) -> Option<&Argument> {
        self.objects.iter().find(|o| o.id() == id)
    }
}
