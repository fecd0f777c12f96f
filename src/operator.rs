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

//! Grounded operator schemas (the compiler's output contract) and their plan-local instances.

use crate::argument::{Argument, VarKind};
use crate::id::{Id, IdGen};
use crate::literal::Literal;
use std::collections::{HashMap, HashSet};

/// A precomputed provider: `(step_num, effect_index)` into [`OperatorPool`].
pub type CndtRef = (usize, usize);

/// A single grounded, reusable operator template, as produced by the (out of scope) compiler.
///
/// Candidate and threat maps are keyed by the *schema-local* precondition index, not by
/// [`Id`], since a schema is instantiated many times and each instantiation mints fresh
/// literal ids.
#[derive(Debug, Clone)]
pub struct OperatorSchema {
    /// Index of this schema into the owning [`OperatorPool`].
    pub step_num: usize,
    /// Name of the action schema (e.g. `"move"`).
    pub name: String,
    /// Parameter list, given fresh ids at every instantiation.
    pub params: Vec<(String, String, VarKind)>,
    /// Preconditions, referencing `params` positions via literal argument names.
    pub preconds: Vec<LiteralTemplate>,
    /// Effects, referencing `params` positions via literal argument names.
    pub effects: Vec<LiteralTemplate>,
    /// Parameter-index pairs that must never co-designate.
    pub nonequals: Vec<(usize, usize)>,
    /// Parameter-index pairs `(area, robot)` extracted from `in_reach` preconditions.
    pub reach_pairs: Vec<(usize, usize)>,
    /// Fixed footprint `(param_idx, width, length)` declared for an Area or Path parameter,
    /// applied at step-insertion time. A hand-built domain with uniformly-sized movable objects
    /// declares a schema's footprint once here rather than deriving it dynamically from whichever
    /// object argument eventually grounds to fill the slot.
    pub dimensions: Vec<(usize, f64, f64)>,
    /// Path-parameter wiring `(path_idx, from_area_idx, to_area_idx)`: declares which two Area
    /// parameters a Path parameter travels between, so its free space and erosion width can be
    /// set generically at step-insertion time.
    pub path_endpoints: Vec<(usize, usize, usize)>,
    /// `false` for the `init`/`goal` sentinels.
    pub instantiable: bool,
    /// height is always 0 for a primitive step; decomposition is not implemented.
    pub height: u32,
    /// `precond index -> providers` (by schema-local effect index on the named step).
    pub candidate_map: HashMap<usize, Vec<CndtRef>>,
    /// `precond index -> threateners` (by schema-local effect index on the named step).
    pub threat_map: HashMap<usize, Vec<CndtRef>>,
}

/// A not-yet-grounded literal referencing a schema's own parameter list by index.
#[derive(Debug, Clone)]
pub struct LiteralTemplate {
    /// Predicate name.
    pub name: String,
    /// Indices into the owning schema's `params`.
    pub arg_indices: Vec<usize>,
    /// Polarity.
    pub truth: bool,
    /// Whether this predicate is static across the whole domain.
    pub is_static: bool,
}

impl LiteralTemplate {
    /// Convenience constructor for a positive, non-static literal template.
    pub fn pos(name: impl Into<String>, arg_indices: Vec<usize>) -> Self {
        Self { name: name.into(), arg_indices, truth: true, is_static: false }
    }

    /// Convenience constructor for a negative, non-static literal template.
    pub fn neg(name: impl Into<String>, arg_indices: Vec<usize>) -> Self {
        Self { name: name.into(), arg_indices, truth: false, is_static: false }
    }
}

/// The immutable, grounder-provided array of reusable operator schemas, indexed by step number.
///
/// The `init`/`goal` sentinels are *not* part of this pool: they are specific to a single
/// problem (they reference its concrete objects and goal literals) rather than reusable across
/// problems, so [`crate::plan::Plan`] keeps them as ordinary [`Step`]s built once at root
/// construction instead of schema entries here.
#[derive(Debug, Clone)]
pub struct OperatorPool {
    schemas: Vec<OperatorSchema>,
}

impl OperatorPool {
    /// Build a pool from instantiable schemas.
    pub fn new(schemas: Vec<OperatorSchema>) -> Self {
        Self { schemas }
    }

    /// All schemas, indexed by step number.
    pub fn schemas(&self) -> &[OperatorSchema] {
        &self.schemas
    }

    /// Schema at a given step number.
    pub fn get(&self, step_num: usize) -> &OperatorSchema {
        &self.schemas[step_num]
    }

    /// Number of schemas in the pool.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the pool has no schemas.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// A plan-local, fully-instantiated occurrence of an [`OperatorSchema`], with its own fresh
/// argument and literal ids.
#[derive(Debug, Clone)]
pub struct Step {
    id: Id,
    step_num: usize,
    name: String,
    args: Vec<Argument>,
    preconds: Vec<Literal>,
    effects: Vec<Literal>,
    nonequals: Vec<(usize, usize)>,
    reach_pairs: Vec<(usize, usize)>,
    dimensions: Vec<(usize, f64, f64)>,
    path_endpoints: Vec<(usize, usize, usize)>,
    open_preconds: HashSet<Id>,
    height: u32,
    instantiable: bool,
}

impl Step {
    /// Build a step directly from already-identified arguments and literals, without minting
    /// fresh ids. Used for the `init`/`goal` sentinels, which are specific to one problem and
    /// must reference the problem's own constant [`Argument`]s rather than fresh copies of them.
    pub fn new_raw(id: Id, step_num: usize, name: impl Into<String>, args: Vec<Argument>, preconds: Vec<Literal>, effects: Vec<Literal>, instantiable: bool) -> Self {
        let open_preconds = preconds.iter().map(|p| p.id()).collect();
        Self {
            id,
            step_num,
            name: name.into(),
            args,
            preconds,
            effects,
            nonequals: Vec::new(),
            reach_pairs: Vec::new(),
            dimensions: Vec::new(),
            path_endpoints: Vec::new(),
            open_preconds,
            height: 0,
            instantiable,
        }
    }

    /// Instantiate a schema into a fresh step, minting new ids for every argument and literal
    /// via `idgen`.
    pub fn instantiate(schema: &OperatorSchema, idgen: &IdGen) -> Self {
        debug_assert_eq!(schema.height, 0, "decomposition is not implemented; every schema must have height 0");
        let args: Vec<Argument> = schema
            .params
            .iter()
            .map(|(ty, name, kind)| Argument::new(idgen.next(), ty.clone(), name.clone(), *kind))
            .collect();

        let build = |tpls: &[LiteralTemplate]| -> Vec<Literal> {
            tpls.iter()
                .map(|t| {
                    let lit_args = t.arg_indices.iter().map(|&i| args[i].clone()).collect();
                    Literal::new(idgen.next(), t.name.clone(), lit_args, t.truth, t.is_static)
                })
                .collect()
        };

        let preconds = build(&schema.preconds);
        let effects = build(&schema.effects);
        let open_preconds = preconds.iter().map(|p| p.id()).collect();

        Self {
            id: idgen.next(),
            step_num: schema.step_num,
            name: schema.name.clone(),
            args,
            preconds,
            effects,
            nonequals: schema.nonequals.clone(),
            reach_pairs: schema.reach_pairs.clone(),
            dimensions: schema.dimensions.clone(),
            path_endpoints: schema.path_endpoints.clone(),
            open_preconds,
            height: schema.height,
            instantiable: schema.instantiable,
        }
    }

    /// Instance identity (distinct from `step_num`, which names the *schema*).
    pub fn id(&self) -> Id {
        self.id
    }

    /// Index into the [`OperatorPool`] this step was instantiated from; used to look up
    /// candidate/threat maps.
    pub fn step_num(&self) -> usize {
        self.step_num
    }

    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instantiated argument list.
    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// Instantiated preconditions.
    pub fn preconds(&self) -> &[Literal] {
        &self.preconds
    }

    /// Instantiated effects.
    pub fn effects(&self) -> &[Literal] {
        &self.effects
    }

    /// Non-equality parameter-index pairs.
    pub fn nonequals(&self) -> &[(usize, usize)] {
        &self.nonequals
    }

    /// Reach parameter-index pairs `(area, robot)`.
    pub fn reach_pairs(&self) -> &[(usize, usize)] {
        &self.reach_pairs
    }

    /// Declared footprints `(param_idx, width, length)` for this step's Area/Path parameters.
    pub fn dimensions(&self) -> &[(usize, f64, f64)] {
        &self.dimensions
    }

    /// Path wiring `(path_idx, from_area_idx, to_area_idx)`.
    pub fn path_endpoints(&self) -> &[(usize, usize, usize)] {
        &self.path_endpoints
    }

    /// Height (always 0; reserved for decomposition, which is unimplemented).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether a fresh instance of this step may be added by the `Add step` refinement.
    pub fn instantiable(&self) -> bool {
        self.instantiable
    }

    /// Whether `precond` is still open on this step.
    pub fn is_open(&self, precond: &Literal) -> bool {
        self.open_preconds.contains(&precond.id())
    }

    /// Mark a precondition fulfilled.
    pub fn fulfill(&mut self, precond: &Literal) {
        self.open_preconds.remove(&precond.id());
    }

    /// All currently-open preconditions.
    pub fn open_preconds(&self) -> impl Iterator<Item = &Literal> {
        self.preconds.iter().filter(move |p| self.open_preconds.contains(&p.id()))
    }
}
