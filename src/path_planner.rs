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

//! Grid-based path resolution and movable-obstacle discovery over the eroded free space.

use crate::id::Id;
use geo::{BooleanOps, Contains, Coord, Intersects, LineString, MultiPolygon, Polygon};
use itertools::Itertools;
use petgraph::prelude::*;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Grid resolution used by [`astar_path`], matching the resolution sanctioned for path
/// resolution's grid-A* fallback (as opposed to the 1 cm step used by area `resolve`).
pub const PATH_GRID_STEP: f64 = 0.1;

/// Erode a region inward by `distance` (half the moving object's smaller dimension). A
/// non-positive distance is a no-op.
pub fn erode(region: &MultiPolygon<f64>, distance: f64) -> MultiPolygon<f64> {
    if distance <= 0.0 {
        return region.clone();
    }
    let mut polys = Vec::new();
    for poly in &region.0 {
        let eroded = geo_buffer::buffer_polygon(poly, -distance);
        polys.extend(eroded.0);
    }
    MultiPolygon::new(polys)
}

/// Buffer a polyline into its swept corridor polygon, by unioning a thin rectangle per segment.
pub fn buffer_line(line: &LineString<f64>, distance: f64) -> MultiPolygon<f64> {
    let coords: Vec<Coord<f64>> = line.coords().copied().collect();
    let mut acc: Option<MultiPolygon<f64>> = None;
    for w in coords.windows(2) {
        let (p0, p1) = (w[0], w[1]);
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len < 1e-9 {
            continue;
        }
        let (nx, ny) = (-dy / len * distance, dx / len * distance);
        let poly = Polygon::new(
            LineString::from(vec![
                (p0.x + nx, p0.y + ny),
                (p1.x + nx, p1.y + ny),
                (p1.x - nx, p1.y - ny),
                (p0.x - nx, p0.y - ny),
                (p0.x + nx, p0.y + ny),
            ]),
            vec![],
        );
        let mp = MultiPolygon::new(vec![poly]);
        acc = Some(match acc {
            Some(a) => a.union(&mp),
            None => mp,
        });
    }
    acc.unwrap_or_else(|| MultiPolygon::new(vec![]))
}

#[derive(PartialEq)]
struct Frontier {
    cost: f64,
    idx: (i64, i64),
}
impl Eq for Frontier {}
impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed, so that `BinaryHeap` (a max-heap) pops the lowest cost first.
        other.cost.partial_cmp(&self.cost).unwrap_or(Ordering::Equal)
    }
}

fn to_point(idx: (i64, i64), grid_res: f64) -> Coord<f64> {
    Coord { x: idx.0 as f64 * grid_res, y: idx.1 as f64 * grid_res }
}

fn to_idx(pt: Coord<f64>, grid_res: f64) -> (i64, i64) {
    ((pt.x / grid_res).round() as i64, (pt.y / grid_res).round() as i64)
}

fn closest_grid_point(free: &MultiPolygon<f64>, pt: Coord<f64>, grid_res: f64) -> Option<(i64, i64)> {
    let origin = to_idx(pt, grid_res);
    if free.contains(&to_point(origin, grid_res)) {
        return Some(origin);
    }
    for radius in 1..40 {
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if dx.abs() != radius && dy.abs() != radius {
                    continue;
                }
                let idx = (origin.0 + dx, origin.1 + dy);
                if free.contains(&to_point(idx, grid_res)) {
                    return Some(idx);
                }
            }
        }
    }
    None
}

/// Find a 4-connected grid path from `start` to `goal` through `free_space`, at `grid_res`
/// resolution. Returns `None` if `free_space` is empty or no path exists.
pub fn astar_path(free_space: &MultiPolygon<f64>, start: Coord<f64>, goal: Coord<f64>, grid_res: f64) -> Option<LineString<f64>> {
    if free_space.0.is_empty() {
        return None;
    }
    let start_idx = closest_grid_point(free_space, start, grid_res)?;
    let goal_idx = closest_grid_point(free_space, goal, grid_res)?;

    let h = |idx: (i64, i64)| {
        let p = to_point(idx, grid_res);
        ((p.x - goal.x).powi(2) + (p.y - goal.y).powi(2)).sqrt()
    };

    let mut open = BinaryHeap::new();
    open.push(Frontier { cost: h(start_idx), idx: start_idx });
    let mut g_score: HashMap<(i64, i64), f64> = HashMap::new();
    g_score.insert(start_idx, 0.0);
    let mut came_from: HashMap<(i64, i64), (i64, i64)> = HashMap::new();

    while let Some(Frontier { idx, .. }) = open.pop() {
        if idx == goal_idx {
            let mut path = vec![idx];
            let mut cur = idx;
            while let Some(&prev) = came_from.get(&cur) {
                path.push(prev);
                cur = prev;
            }
            path.reverse();
            let mut coords: Vec<Coord<f64>> = vec![start];
            coords.extend(path.into_iter().map(|i| to_point(i, grid_res)));
            coords.push(goal);
            return Some(LineString::from(coords));
        }
        let current_g = *g_score.get(&idx).unwrap_or(&f64::INFINITY);
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let next = (idx.0 + dx, idx.1 + dy);
            if !free_space.contains(&to_point(next, grid_res)) {
                continue;
            }
            let tentative = current_g + grid_res;
            if tentative < *g_score.get(&next).unwrap_or(&f64::INFINITY) {
                g_score.insert(next, tentative);
                came_from.insert(next, idx);
                open.push(Frontier { cost: tentative + h(next), idx: next });
            }
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Node {
    Component(usize),
    Obstacle(Id),
}

/// Discover every minimum-cardinality set of obstacles that, if moved, would connect `start` to
/// `goal` through `components` (the eroded free space, possibly disconnected).
///
/// `obstacles` are the disjoint-area arguments currently blocking the path, each with its
/// (slightly inflated) assigned polygon. An edge exists between two nodes whenever their
/// polygons intersect; traversing a component costs 0, traversing an obstacle costs 1.
pub fn find_movable_obstacles(
    components: &MultiPolygon<f64>,
    obstacles: &[(Id, Polygon<f64>)],
    start: Coord<f64>,
    goal: Coord<f64>,
) -> Vec<Vec<Id>> {
    let comps: Vec<&Polygon<f64>> = components.0.iter().collect();
    let start_comp = comps.iter().position(|p| p.contains(&start));
    let goal_comp = comps.iter().position(|p| p.contains(&goal));
    let (start_comp, goal_comp) = match (start_comp, goal_comp) {
        (Some(s), Some(g)) => (s, g),
        _ => return Vec::new(),
    };
    if start_comp == goal_comp {
        return vec![Vec::new()];
    }

    let mut graph: Graph<Node, (), Undirected> = Graph::new_undirected();
    let mut node_index: HashMap<Node, NodeIndex> = HashMap::new();
    for i in 0..comps.len() {
        let n = Node::Component(i);
        node_index.insert(n, graph.add_node(n));
    }
    for (id, _) in obstacles {
        let n = Node::Obstacle(*id);
        node_index.insert(n, graph.add_node(n));
    }
    for (i, ci) in comps.iter().enumerate() {
        for (oid, opoly) in obstacles {
            if ci.intersects(*opoly) {
                graph.add_edge(node_index[&Node::Component(i)], node_index[&Node::Obstacle(*oid)], ());
            }
        }
    }
    for a in 0..obstacles.len() {
        for b in (a + 1)..obstacles.len() {
            if obstacles[a].1.intersects(&obstacles[b].1) {
                graph.add_edge(node_index[&Node::Obstacle(obstacles[a].0)], node_index[&Node::Obstacle(obstacles[b].0)], ());
            }
        }
    }

    let cost = |n: Node| -> u32 {
        match n {
            Node::Component(_) => 0,
            Node::Obstacle(_) => 1,
        }
    };

    let start_node = node_index[&Node::Component(start_comp)];
    let goal_node = node_index[&Node::Component(goal_comp)];

    let mut dist: HashMap<NodeIndex, u32> = HashMap::new();
    let mut preds: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
    dist.insert(start_node, 0);
    let mut heap = BinaryHeap::new();
    heap.push((std::cmp::Reverse(0u32), start_node));
    while let Some((std::cmp::Reverse(d), u)) = heap.pop() {
        if d > *dist.get(&u).unwrap_or(&u32::MAX) {
            continue;
        }
        for v in graph.neighbors(u) {
            let nd = d + cost(graph[v]);
            let best = *dist.get(&v).unwrap_or(&u32::MAX);
            if nd < best {
                dist.insert(v, nd);
                preds.insert(v, vec![u]);
                heap.push((std::cmp::Reverse(nd), v));
            } else if nd == best {
                preds.entry(v).or_default().push(u);
            }
        }
    }

    if !dist.contains_key(&goal_node) {
        return Vec::new();
    }

    let mut results = Vec::new();
    let mut stack = vec![(goal_node, Vec::<Id>::new())];
    while let Some((node, mut acc)) = stack.pop() {
        if let Node::Obstacle(id) = graph[node] {
            acc.push(id);
        }
        if node == start_node {
            acc.sort();
            results.push(acc);
            continue;
        }
        for &p in preds.get(&node).into_iter().flatten() {
            stack.push((p, acc.clone()));
        }
    }
    // distinct predecessor chains can retrace the same obstacle set; a minimum-cost set should
    // only ever be offered to refinement once.
    results.into_iter().unique().collect()
}

#[cfg(test)]
mod test_path_planner {
    use super::*;
    use geo::Coord;

    fn square(x: f64, y: f64, s: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(x, y), (x + s, y), (x + s, y + s), (x, y + s), (x, y)]),
            vec![],
        )
    }

    #[test]
    fn astar_finds_straight_path_in_open_space() {
        let free = MultiPolygon::new(vec![square(0.0, 0.0, 2.0)]);
        let path = astar_path(&free, Coord { x: 0.1, y: 0.1 }, Coord { x: 1.9, y: 1.9 }, PATH_GRID_STEP);
        assert!(path.is_some());
    }

    #[test]
    fn astar_fails_with_no_free_space() {
        let free = MultiPolygon::new(vec![]);
        let path = astar_path(&free, Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }, PATH_GRID_STEP);
        assert!(path.is_none());
    }

    #[test]
    fn movable_obstacle_found_when_blocking_single_corridor() {
        let left = square(0.0, 0.0, 1.0);
        let right = square(2.0, 0.0, 1.0);
        let components = MultiPolygon::new(vec![left, right]);
        let blocker = square(1.0, -0.1, 1.2);
        let sets = find_movable_obstacles(&components, &[(Id(7), blocker)], Coord { x: 0.5, y: 0.5 }, Coord { x: 2.5, y: 0.5 });
        assert_eq!(sets, vec![vec![Id(7)]]);
    }
}
