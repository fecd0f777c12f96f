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

//! The geometric placement CSP: area variables with a monotonically-shrinking max-region, path
//! variables with an assigned corridor, and the `resolve`/`resolve_path` grounding procedures.

use crate::argument::Argument;
use crate::id::Id;
use crate::path_planner;
use geo::{BooleanOps, BoundingRect, Contains, Coord, LineString, MultiPolygon, Polygon};
use std::collections::{HashMap, HashSet};

/// Step used by `resolve`'s grid sweep, in metres (1 cm).
pub const RESOLVE_GRID_STEP: f64 = 0.01;
/// Small numerical tolerance used for "contained up to rounding" checks.
pub const EPS: f64 = 1e-7;

fn poly_area(p: &MultiPolygon<f64>) -> f64 {
    use geo::Area;
    p.unsigned_area()
}

fn rect(min: Coord<f64>, w: f64, l: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (min.x, min.y),
            (min.x + w, min.y),
            (min.x + w, min.y + l),
            (min.x, min.y + l),
            (min.x, min.y),
        ]),
        vec![],
    )
}

/// Returns true if `inner` lies inside `outer` up to [`EPS`] (tested via area-of-difference).
fn contained_with_tolerance(inner: &MultiPolygon<f64>, outer: &MultiPolygon<f64>) -> bool {
    let diff = inner.difference(outer);
    poly_area(&diff) <= EPS
}

#[derive(Debug, Clone)]
struct AreaRecord {
    owner: Option<Id>,
    width: f64,
    length: f64,
    max_region: Option<MultiPolygon<f64>>,
    assigned: Option<MultiPolygon<f64>>,
    within: Vec<WithinTarget>,
    disjunctions: HashSet<Id>,
}

#[derive(Debug, Clone)]
enum WithinTarget {
    Area(Id),
    Named(String),
}

impl Default for AreaRecord {
    fn default() -> Self {
        Self { owner: None, width: 0.0, length: 0.0, max_region: None, assigned: None, within: Vec::new(), disjunctions: HashSet::new() }
    }
}

#[derive(Debug, Clone)]
struct PathRecord {
    width: f64,
    length: f64,
    start: Option<Id>,
    goal: Option<Id>,
    disjunctions: HashSet<Id>,
    assigned_line: Option<LineString<f64>>,
    assigned_corridor: Option<MultiPolygon<f64>>,
}

impl Default for PathRecord {
    fn default() -> Self {
        Self { width: 0.0, length: 0.0, start: None, goal: None, disjunctions: HashSet::new(), assigned_line: None, assigned_corridor: None }
    }
}

/// The geometric side of the variable bindings.
#[derive(Debug, Clone, Default)]
pub struct GeometricBindings {
    areas: HashMap<Id, AreaRecord>,
    paths: HashMap<Id, PathRecord>,
    named: HashMap<String, MultiPolygon<f64>>,
    base: Option<MultiPolygon<f64>>,
}

impl GeometricBindings {
    /// An empty geometric binding set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named, immutable region of the workspace (including the base area and every
    /// robot's reach region).
    pub fn set_named_area(&mut self, name: impl Into<String>, poly: Polygon<f64>) {
        self.named.insert(name.into(), MultiPolygon::new(vec![poly]));
    }

    /// Declare the workspace's base polygon. Every area's max-region is bounded by it.
    pub fn set_base(&mut self, poly: Polygon<f64>) {
        self.base = Some(MultiPolygon::new(vec![poly]));
    }

    /// Register an area variable (idempotent), seeding its max-region at the base area.
    pub fn register_area(&mut self, arg: &Argument) {
        self.areas.entry(arg.id()).or_insert_with(|| AreaRecord {
            max_region: self.base.clone(),
            ..Default::default()
        });
    }

    /// Register a path variable (idempotent).
    pub fn register_path(&mut self, arg: &Argument) {
        self.paths.entry(arg.id()).or_default();
    }

    /// Set the object-dimensions of an area variable's placed object.
    pub fn set_dimensions(&mut self, area: Id, width: f64, length: f64) {
        if let Some(r) = self.areas.get_mut(&area) {
            r.width = width;
            r.length = length;
        }
    }

    /// Link an area variable to the symbolic object variable it places.
    pub fn set_owner(&mut self, area: Id, owner: Id) {
        if let Some(r) = self.areas.get_mut(&area) {
            r.owner = Some(owner);
        }
    }

    /// The symbolic object variable placed by `area`, if any `within` literal has named one.
    pub fn owner(&self, area: Id) -> Option<Id> {
        self.areas.get(&area).and_then(|r| r.owner)
    }

    /// Declare the start/goal area variables and object dimensions of a path variable.
    pub fn set_path_endpoints(&mut self, path: Id, start: Id, goal: Id, width: f64, length: f64) {
        if let Some(r) = self.paths.get_mut(&path) {
            r.start = Some(start);
            r.goal = Some(goal);
            r.width = width;
            r.length = length;
        }
    }

    /// Intersect `area`'s max-region with the polygon named by `robot_name`'s reach area.
    pub fn constrain_within_named_reach(&mut self, area: Id, robot_name: &str) {
        let reach_key = format!("reach:{}", robot_name);
        self.within_named(area, &reach_key);
    }

    /// `area` is constrained to lie within the named region `name`.
    pub fn within_named(&mut self, area: Id, name: &str) -> bool {
        let target = match self.named.get(name) {
            Some(p) => p.clone(),
            None => return false,
        };
        let ok = self.shrink_max_region(area, &target);
        if ok {
            if let Some(r) = self.areas.get_mut(&area) {
                r.within.push(WithinTarget::Named(name.to_string()));
            }
        }
        ok
    }

    /// The monotone-shrink `unify`: `a` becomes constrained within `b` (and, symmetrically,
    /// within `b`'s own max-region). Idempotent once recorded.
    pub fn unify_area(&mut self, a: Id, b: Id) -> bool {
        if a == b {
            return true;
        }
        if self.areas.get(&a).map(|r| r.within.iter().any(|t| matches!(t, WithinTarget::Area(x) if *x == b))).unwrap_or(false) {
            return true;
        }
        let b_region = match self.areas.get(&b).and_then(|r| r.max_region.clone()) {
            Some(p) => p,
            None => return false,
        };
        if !self.shrink_max_region(a, &b_region) {
            return false;
        }
        if let Some(r) = self.areas.get_mut(&a) {
            r.within.push(WithinTarget::Area(b));
        }
        true
    }

    fn shrink_max_region(&mut self, area: Id, bound: &MultiPolygon<f64>) -> bool {
        let current = match self.areas.get(&area).and_then(|r| r.max_region.clone()) {
            Some(c) => c,
            None => return false,
        };
        let intersected = current.intersection(bound);
        if poly_area(&intersected) <= EPS {
            return false;
        }
        let (w, l) = self.areas.get(&area).map(|r| (r.width, r.length)).unwrap_or((0.0, 0.0));
        if w > EPS && l > EPS {
            let bbox = match intersected.bounding_rect() {
                Some(b) => b,
                None => return false,
            };
            if bbox.width() + EPS < w || bbox.height() + EPS < l {
                return false;
            }
        }
        self.areas.get_mut(&area).unwrap().max_region = Some(intersected);
        true
    }

    /// Declare that `a` and `b`'s assignments must eventually be disjoint. Symmetric, idempotent.
    pub fn add_disjunction(&mut self, a: Id, b: Id) {
        if let Some(r) = self.areas.get_mut(&a) {
            r.disjunctions.insert(b);
        } else if let Some(r) = self.paths.get_mut(&a) {
            r.disjunctions.insert(b);
        }
        if let Some(r) = self.areas.get_mut(&b) {
            r.disjunctions.insert(a);
        } else if let Some(r) = self.paths.get_mut(&b) {
            r.disjunctions.insert(a);
        }
    }

    /// Remove a previously-declared disjunction (used when movable-obstacle discovery decides to
    /// let a path cross a specific obstacle's area by moving it instead).
    pub fn remove_disjunction(&mut self, a: Id, b: Id) {
        if let Some(r) = self.areas.get_mut(&a) {
            r.disjunctions.remove(&b);
        } else if let Some(r) = self.paths.get_mut(&a) {
            r.disjunctions.remove(&b);
        }
        if let Some(r) = self.areas.get_mut(&b) {
            r.disjunctions.remove(&a);
        } else if let Some(r) = self.paths.get_mut(&b) {
            r.disjunctions.remove(&a);
        }
    }

    fn disjunct_max(&self, area: Id) -> Option<MultiPolygon<f64>> {
        let r = self.areas.get(&area)?;
        let base = r.max_region.clone()?;
        let mut result = base;
        for d in &r.disjunctions {
            if let Some(other) = self.areas.get(d).and_then(|o| o.assigned.clone()) {
                result = result.difference(&other);
            }
        }
        Some(result)
    }

    fn a_min(&self, area: Id) -> Option<MultiPolygon<f64>> {
        let mut acc: Option<MultiPolygon<f64>> = None;
        for (id, r) in &self.areas {
            if *id == area {
                continue;
            }
            let constrained_within = r.within.iter().any(|t| matches!(t, WithinTarget::Area(x) if *x == area));
            if constrained_within {
                if let Some(assigned) = &r.assigned {
                    acc = Some(match acc {
                        Some(a) => a.union(assigned),
                        None => assigned.clone(),
                    });
                }
            }
        }
        acc
    }

    /// Ground a single area variable to a concrete placement polygon.
    ///
    /// 1. compute `disjunct_max`
    /// 2. compute `a_min` (union of everything already constrained within this area)
    /// 3. if `a_min`'s bounding box already fits, assign that box
    /// 4. else grid-sample candidate boxes inside `disjunct_max` stepping by 1 cm
    /// 5. fail if the sweep is exhausted
    pub fn resolve(&mut self, area: Id) -> bool {
        if self.areas.get(&area).map(|r| r.assigned.is_some()).unwrap_or(false) {
            return true;
        }
        let disjunct_max = match self.disjunct_max(area) {
            Some(m) => m,
            None => return false,
        };
        let (w, l) = self.areas.get(&area).map(|r| (r.width.max(0.0), r.length.max(0.0))).unwrap_or((0.0, 0.0));
        let a_min = self.a_min(area);

        if let Some(ref m) = a_min {
            if let Some(bbox) = m.bounding_rect() {
                let box_w = bbox.width().max(w);
                let box_l = bbox.height().max(l);
                let candidate = rect(bbox.min(), box_w, box_l);
                let candidate_mp = MultiPolygon::new(vec![candidate.clone()]);
                if contained_with_tolerance(&candidate_mp, &disjunct_max) {
                    self.areas.get_mut(&area).unwrap().assigned = Some(candidate_mp);
                    return true;
                }
            }
        }

        let bbox = match disjunct_max.bounding_rect() {
            Some(b) => b,
            None => return false,
        };
        let (box_w, box_l) = if w > EPS && l > EPS { (w, l) } else { (RESOLVE_GRID_STEP, RESOLVE_GRID_STEP) };

        let mut y = bbox.min().y;
        while y + box_l <= bbox.max().y + EPS {
            let mut x = bbox.min().x;
            while x + box_w <= bbox.max().x + EPS {
                let candidate = rect(Coord { x, y }, box_w, box_l);
                let candidate_mp = MultiPolygon::new(vec![candidate]);
                let fits_a_min = a_min.as_ref().map(|m| candidate_mp.contains(m) || poly_area(&m.difference(&candidate_mp)) <= EPS).unwrap_or(true);
                if fits_a_min && contained_with_tolerance(&candidate_mp, &disjunct_max) {
                    self.areas.get_mut(&area).unwrap().assigned = Some(candidate_mp);
                    return true;
                }
                x += RESOLVE_GRID_STEP;
            }
            y += RESOLVE_GRID_STEP;
        }
        false
    }

    /// Compute the navigable free space for a path variable: base − disjunctions. No operator
    /// schema in this crate declares a path-local `within` region, so unlike an area's own
    /// `max_region` (narrowed by `unify_area`/`within_named`), a path's free space is never
    /// narrower than the workspace base except by the obstacles explicitly disjoined against it.
    fn free_space(&self, path: Id) -> Option<MultiPolygon<f64>> {
        let r = self.paths.get(&path)?;
        let mut space = self.base.clone()?;
        for d in &r.disjunctions {
            if let Some(other) = self.areas.get(d).and_then(|o| o.assigned.clone()) {
                space = space.difference(&other);
            }
        }
        Some(space)
    }

    /// Ground a path variable's corridor between its start and goal area centroids.
    pub fn resolve_path(&mut self, path: Id) -> bool {
        let (start, goal, width, length) = match self.paths.get(&path) {
            Some(r) => (r.start, r.goal, r.width, r.length),
            None => return false,
        };
        let (start, goal) = match (start, goal) {
            (Some(s), Some(g)) => (s, g),
            _ => return false,
        };
        let start_poly = match self.areas.get(&start).and_then(|r| r.assigned.clone().or_else(|| r.max_region.clone())) {
            Some(p) => p,
            None => return false,
        };
        let goal_poly = match self.areas.get(&goal).and_then(|r| r.assigned.clone().or_else(|| r.max_region.clone())) {
            Some(p) => p,
            None => return false,
        };
        let start_pt = match start_poly.bounding_rect() {
            Some(b) => b.center(),
            None => return false,
        };
        let goal_pt = match goal_poly.bounding_rect() {
            Some(b) => b.center(),
            None => return false,
        };
        let free = match self.free_space(path) {
            Some(f) => f,
            None => return false,
        };
        let erosion = (width.min(length)) / 2.0;
        let eroded = path_planner::erode(&free, erosion);

        match path_planner::astar_path(&eroded, start_pt, goal_pt, path_planner::PATH_GRID_STEP) {
            Some(line) => {
                let corridor = path_planner::buffer_line(&line, erosion);
                let r = self.paths.get_mut(&path).unwrap();
                r.assigned_line = Some(line);
                r.assigned_corridor = Some(corridor);
                true
            }
            None => false,
        }
    }

    /// The eroded free space of a path variable, with its own erosion distance — used by
    /// movable-obstacle discovery when `resolve_path` has already failed.
    pub fn eroded_free_space(&self, path: Id) -> Option<(MultiPolygon<f64>, f64, Coord<f64>, Coord<f64>)> {
        let r = self.paths.get(&path)?;
        let (start, goal) = (r.start?, r.goal?);
        let free = self.free_space(path)?;
        let erosion = (r.width.min(r.length)) / 2.0;
        let eroded = path_planner::erode(&free, erosion);
        let start_pt = self.areas.get(&start)?.assigned.clone().or_else(|| self.areas.get(&start)?.max_region.clone())?.bounding_rect()?.center();
        let goal_pt = self.areas.get(&goal)?.assigned.clone().or_else(|| self.areas.get(&goal)?.max_region.clone())?.bounding_rect()?.center();
        Some((eroded, erosion, start_pt, goal_pt))
    }

    /// Every area variable's assigned polygon, for GTF threat scans and JSON export.
    pub fn assigned_areas(&self) -> impl Iterator<Item = (Id, &MultiPolygon<f64>)> {
        self.areas.iter().filter_map(|(id, r)| r.assigned.as_ref().map(|p| (*id, p)))
    }

    /// Area ids still missing an assignment, in a deterministic (ascending id) order.
    pub fn ungrounded_areas(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.areas.iter().filter(|(_, r)| r.assigned.is_none()).map(|(id, _)| *id).collect();
        ids.sort();
        ids
    }

    /// Path ids still missing an assignment, in a deterministic (ascending id) order.
    pub fn ungrounded_paths(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.paths.iter().filter(|(_, r)| r.assigned_corridor.is_none()).map(|(id, _)| *id).collect();
        ids.sort();
        ids
    }

    /// Every area's current max-region (used to size candidate pools by area, smallest first).
    pub fn max_region_area(&self, area: Id) -> f64 {
        self.areas.get(&area).and_then(|r| r.max_region.as_ref()).map(poly_area).unwrap_or(f64::INFINITY)
    }

    /// Snapshot of every grounded area's assigned polygon's exterior coordinates.
    pub fn assignments(&self) -> HashMap<Id, Vec<(f64, f64)>> {
        self.areas
            .iter()
            .filter_map(|(id, r)| {
                r.assigned.as_ref().and_then(|mp| mp.0.first()).map(|poly| {
                    let coords: Vec<(f64, f64)> = poly.exterior().coords().map(|c| (c.x, c.y)).collect();
                    (*id, coords)
                })
            })
            .collect()
    }

    /// Two grounded areas' assigned polygons overlap (used by GTF detection and `check_plan`).
    pub fn areas_overlap(&self, a: Id, b: Id) -> bool {
        match (self.areas.get(&a).and_then(|r| r.assigned.as_ref()), self.areas.get(&b).and_then(|r| r.assigned.as_ref())) {
            (Some(pa), Some(pb)) => poly_area(&pa.intersection(pb)) > EPS,
            _ => false,
        }
    }

    /// Every already-assigned area (other than `area` itself) whose polygon overlaps `area`'s
    /// current max-region — the set a failed `resolve` should turn into disjunctions. Returned
    /// in a deterministic (ascending id) order, since it drives how many refinement children
    /// get generated and in what order.
    pub fn blocking_assigned_areas(&self, area: Id) -> Vec<Id> {
        let region = match self.areas.get(&area).and_then(|r| r.max_region.as_ref()) {
            Some(m) => m,
            None => return Vec::new(),
        };
        let mut ids: Vec<Id> = self
            .areas
            .iter()
            .filter(|(id, r)| **id != area && r.assigned.as_ref().map(|p| poly_area(&region.intersection(p)) > EPS).unwrap_or(false))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Every assigned area's polygon, as a flat list ordered by ascending id — used by
    /// movable-obstacle discovery, which treats each as a single-polygon obstacle.
    pub fn assigned_area_polygons(&self) -> Vec<(Id, Polygon<f64>)> {
        let mut out: Vec<(Id, Polygon<f64>)> =
            self.areas.iter().filter_map(|(id, r)| r.assigned.as_ref().and_then(|mp| mp.0.first()).map(|p| (*id, p.clone()))).collect();
        out.sort_by_key(|(id, _)| *id);
        out
    }

    /// Whether `area`'s assigned polygon is at least as large as its own declared object
    /// dimensions. `true` if either is missing: an ungrounded area is reported by
    /// [`Self::ungrounded_areas`] instead, and a dimension-less area was never given a footprint
    /// to validate against.
    pub fn fits_dimensions(&self, area: Id) -> bool {
        let r = match self.areas.get(&area) {
            Some(r) => r,
            None => return true,
        };
        if r.width <= EPS || r.length <= EPS {
            return true;
        }
        let assigned = match &r.assigned {
            Some(a) => a,
            None => return true,
        };
        match assigned.bounding_rect() {
            Some(b) => b.width() + EPS >= r.width && b.height() + EPS >= r.length,
            None => false,
        }
    }

    /// Whether `a` is directly constrained (by `unify_area` or `within_named`) to lie within `b`
    /// — used to tell a deliberate containment (e.g. a box inside its goal region) apart from an
    /// accidental overlap between two unrelated placements.
    pub fn is_constrained_within(&self, a: Id, b: Id) -> bool {
        self.areas.get(&a).map(|r| r.within.iter().any(|t| matches!(t, WithinTarget::Area(x) if *x == b))).unwrap_or(false)
    }

    /// Whether `a` and `b` have been declared disjoint (by a `Gtf`/`Gptf` resolution or explicit
    /// movable-obstacle bookkeeping).
    pub fn is_disjunct(&self, a: Id, b: Id) -> bool {
        self.areas.get(&a).map(|r| r.disjunctions.contains(&b)).unwrap_or(false)
    }

    /// Whether `area`'s assigned polygon (if grounded) lies within the named region `name`.
    /// `true` if either is missing — an ungrounded area has nothing yet to validate.
    pub fn is_within_named(&self, area: Id, name: &str) -> bool {
        let assigned = match self.areas.get(&area).and_then(|r| r.assigned.as_ref()) {
            Some(a) => a,
            None => return true,
        };
        match self.named.get(name) {
            Some(region) => contained_with_tolerance(assigned, region),
            None => true,
        }
    }

    /// Whether every already-resolved path corridor still avoids every other assigned area's
    /// footprint that it did not explicitly disjoin against at resolve time (a later area
    /// assignment could otherwise silently invalidate an earlier corridor).
    pub fn corridors_collision_free(&self) -> bool {
        for (path_id, r) in &self.paths {
            let corridor = match &r.assigned_corridor {
                Some(c) => c,
                None => continue,
            };
            for (area_id, area_r) in &self.areas {
                if Some(*area_id) == r.start || Some(*area_id) == r.goal {
                    continue;
                }
                if r.disjunctions.contains(area_id) {
                    continue;
                }
                if let Some(assigned) = &area_r.assigned {
                    if poly_area(&corridor.intersection(assigned)) > EPS {
                        trace_path_collision(*path_id, *area_id);
                        return false;
                    }
                }
            }
        }
        true
    }
}

fn trace_path_collision(path: Id, area: Id) {
    log::trace!("path {} corridor collides with un-disjoined area {}", path.0, area.0);
}

#[cfg(test)]
mod test_geometric {
    use super::*;
    use crate::argument::VarKind;
    use crate::id::IdGen;
    use geo::Coord;

    fn square(x: f64, y: f64, s: f64) -> Polygon<f64> {
        rect(Coord { x, y }, s, s)
    }

    #[test]
    fn resolve_assigns_within_max_region() {
        let idgen = IdGen::new();
        let mut g = GeometricBindings::new();
        g.set_base(square(0.0, 0.0, 2.0));
        let a1 = Argument::new(idgen.next(), "area", "?a1", VarKind::Area);
        g.register_area(&a1);
        g.set_dimensions(a1.id(), 0.2, 0.2);
        assert!(g.resolve(a1.id()));
        assert!(g.areas.get(&a1.id()).unwrap().assigned.is_some());
    }

    #[test]
    fn unify_shrinks_and_is_idempotent() {
        let idgen = IdGen::new();
        let mut g = GeometricBindings::new();
        g.set_base(square(0.0, 0.0, 2.0));
        let a1 = Argument::new(idgen.next(), "area", "?a1", VarKind::Area);
        let a2 = Argument::new(idgen.next(), "area", "?a2", VarKind::Area);
        g.register_area(&a1);
        g.register_area(&a2);
        // shrink a2's own bound first so unify has something non-trivial to intersect
        g.areas.get_mut(&a2.id()).unwrap().max_region = Some(MultiPolygon::new(vec![square(0.0, 0.0, 1.0)]));
        assert!(g.unify_area(a1.id(), a2.id()));
        assert!(g.unify_area(a1.id(), a2.id()));
        let region_area = poly_area(g.areas.get(&a1.id()).unwrap().max_region.as_ref().unwrap());
        assert!(region_area <= 1.0 + EPS);
    }

    #[test]
    fn disjunction_is_symmetric() {
        let idgen = IdGen::new();
        let mut g = GeometricBindings::new();
        let a1 = Argument::new(idgen.next(), "area", "?a1", VarKind::Area);
        let a2 = Argument::new(idgen.next(), "area", "?a2", VarKind::Area);
        g.register_area(&a1);
        g.register_area(&a2);
        g.add_disjunction(a1.id(), a2.id());
        assert!(g.areas[&a1.id()].disjunctions.contains(&a2.id()));
        assert!(g.areas[&a2.id()].disjunctions.contains(&a1.id()));
    }
}
