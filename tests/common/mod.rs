//! Shared fixtures for the end-to-end scenario tests: a workspace square and a helper that
//! drives `refine::refine` through a run of single-child flaw resolutions (grounding flaws left
//! stale by a hand-built fixture) until it finally hits the branch or dead end under test.

use geo::{LineString, Polygon};
use poclsolver::plan::Plan;
use poclsolver::refine;

/// An axis-aligned square of side `s`, anchored at the origin — every scenario's base area.
pub fn square(x: f64, y: f64, s: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (x, y),
            (x + s, y),
            (x + s, y + s),
            (x, y + s),
            (x, y),
        ]),
        vec![],
    )
}

/// Repeatedly calls `refine::refine` while it keeps returning exactly one child (draining
/// ungrounded-variable flaws a hand-built fixture left stale), and returns the last plan reached
/// together with whatever `refine` produced for it — zero children for a dead end, more than one
/// for the branch under test. Panics if the chain runs past `max_steps` without settling.
pub fn drive_while_single(mut plan: Plan, max_steps: usize) -> (Plan, Vec<Plan>) {
    for _ in 0..max_steps {
        let children = refine::refine(&plan);
        if children.len() != 1 {
            return (plan, children);
        }
        plan = children.into_iter().next().unwrap();
    }
    panic!("flaw queue did not settle within {} refine() calls", max_steps);
}
