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

//! Flaws and the priority-bucketed flaw library.
//!
//! Bucket priority order is `statics, inits, threats, unsafe, reusable, nonreusable`, as stated
//! by this planner's own contract. One widely-circulated reference implementation of this
//! algorithm actually constructs its bucket list with `threats` and `inits` transposed relative
//! to that documented order; this implementation follows the documented order rather than that
//! slip.

use crate::causal_link::CausalLink;
use crate::id::Id;

/// A concrete deficiency blocking a partial plan from being a solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flaw {
    /// Open precondition: `consumer` still needs `precondition` established.
    Opf { consumer: Id, precondition: Id },
    /// A causal link is threatened by `threat`.
    Tclf { threat: Id, link: CausalLink },
    /// An ungrounded symbolic (object-typed) variable.
    Ugsv { arg: Id },
    /// An ungrounded geometric area variable.
    Uggv { arg: Id },
    /// An ungrounded geometric path variable.
    Ugpv { arg: Id },
    /// Two grounded area placements overlap.
    Gtf { threatened: Id, threatening: Id },
    /// A grounded path's corridor overlaps a static or dynamic placement.
    Gptf { path: Id, obstacle: Id },
}

impl Flaw {
    /// Deterministic secondary sort key within a bucket, derived from the payload's own ids —
    /// arbitrary but stable, matching the spec's allowance that any deterministic total order is
    /// acceptable here.
    fn tiebreaker(&self) -> i64 {
        match self {
            Flaw::Opf { consumer, precondition } => consumer.0 as i64 + precondition.0 as i64,
            Flaw::Tclf { threat, link } => threat.0 as i64 + link.sink.0 as i64,
            Flaw::Ugsv { arg } | Flaw::Uggv { arg } | Flaw::Ugpv { arg } => arg.0 as i64,
            Flaw::Gtf { threatened, threatening } => threatened.0 as i64 + threatening.0 as i64,
            Flaw::Gptf { path, obstacle } => path.0 as i64 + obstacle.0 as i64,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Bucket(Vec<(i64, Flaw)>);

impl Bucket {
    fn insert(&mut self, criteria: i64, flaw: Flaw) {
        let key = (criteria, flaw.tiebreaker());
        let pos = self.0.partition_point(|(c, f)| (*c, f.tiebreaker()) < key);
        self.0.insert(pos, (criteria, flaw));
    }

    fn pop_front(&mut self) -> Option<Flaw> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.remove(0).1)
        }
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn iter(&self) -> impl Iterator<Item = &Flaw> {
        self.0.iter().map(|(_, f)| f)
    }
}

/// The six priority-ordered flaw buckets.
#[derive(Debug, Clone, Default)]
pub struct FlawLibrary {
    statics: Bucket,
    inits: Bucket,
    threats: Bucket,
    r#unsafe: Bucket,
    reusable: Bucket,
    nonreusable: Bucket,
}

impl FlawLibrary {
    /// An empty flaw library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route an open-precondition flaw into its bucket.
    ///
    /// - `is_static`: the precondition's predicate never appears as any effect.
    /// - `in_init`: the literal is already true in the initial state.
    /// - `risks`: number of steps in the current plan that could threaten any provider of this
    ///   precondition.
    /// - `cndts`: number of existing steps in the plan that are candidate providers.
    pub fn insert_opf(&mut self, consumer: Id, precondition: Id, is_static: bool, in_init: bool, risks: usize, cndts: usize) {
        let flaw = Flaw::Opf { consumer, precondition };
        let criteria = (consumer.0 as i64) << 1;
        if is_static {
            self.statics.insert(criteria, flaw);
        } else if in_init {
            self.inits.insert(criteria, flaw);
        } else if risks > 0 {
            self.r#unsafe.insert(criteria, flaw);
        } else if cndts > 0 {
            self.reusable.insert(criteria, flaw);
        } else {
            self.nonreusable.insert(criteria, flaw);
        }
    }

    /// Route a (now-promoted-to-real) threatened causal link.
    pub fn insert_tclf(&mut self, threat: Id, link: CausalLink) {
        let criteria = threat.0 as i64;
        self.threats.insert(criteria, Flaw::Tclf { threat, link });
    }

    /// Route an ungrounded symbolic variable flaw — alongside threats, per the documented bucket
    /// order.
    pub fn insert_ugsv(&mut self, arg: Id) {
        self.threats.insert(arg.0 as i64, Flaw::Ugsv { arg });
    }

    /// Route an ungrounded geometric area variable flaw.
    pub fn insert_uggv(&mut self, arg: Id) {
        self.threats.insert(arg.0 as i64, Flaw::Uggv { arg });
    }

    /// Route an ungrounded geometric path variable flaw.
    pub fn insert_ugpv(&mut self, arg: Id) {
        self.threats.insert(arg.0 as i64, Flaw::Ugpv { arg });
    }

    /// Route a geometric placement threat.
    pub fn insert_gtf(&mut self, threatened: Id, threatening: Id) {
        self.threats.insert(threatened.0 as i64, Flaw::Gtf { threatened, threatening });
    }

    /// Route a geometric path threat.
    pub fn insert_gptf(&mut self, path: Id, obstacle: Id) {
        self.threats.insert(path.0 as i64, Flaw::Gptf { path, obstacle });
    }

    /// Pop the highest-priority flaw, if any remain.
    pub fn next(&mut self) -> Option<Flaw> {
        for bucket in [&mut self.statics, &mut self.inits, &mut self.threats, &mut self.r#unsafe, &mut self.reusable, &mut self.nonreusable] {
            if !bucket.is_empty() {
                return bucket.pop_front();
            }
        }
        None
    }

    /// Whether every bucket is empty (a flawless, solved plan).
    pub fn is_empty(&self) -> bool {
        self.statics.is_empty()
            && self.inits.is_empty()
            && self.threats.is_empty()
            && self.r#unsafe.is_empty()
            && self.reusable.is_empty()
            && self.nonreusable.is_empty()
    }

    /// Total number of pending flaws, used by the frontier's tie-breaking key.
    pub fn len(&self) -> usize {
        self.statics.len() + self.inits.len() + self.threats.len() + self.r#unsafe.len() + self.reusable.len() + self.nonreusable.len()
    }

    /// Open-precondition flaws only, for the heuristic (which ignores ungrounded-variable and
    /// geometric flaws entirely, per this planner's documented simplification).
    pub fn open_precondition_flaws(&self) -> impl Iterator<Item = &Flaw> {
        self.statics
            .iter()
            .chain(self.inits.iter())
            .chain(self.r#unsafe.iter())
            .chain(self.reusable.iter())
            .chain(self.nonreusable.iter())
    }
}

#[cfg(test)]
mod test_flaw {
    use super::*;

    #[test]
    fn bucket_priority_order_is_statics_inits_threats_unsafe_reusable_nonreusable() {
        let mut lib = FlawLibrary::new();
        lib.insert_opf(Id(1), Id(2), false, false, 0, 0); // nonreusable
        lib.insert_opf(Id(3), Id(4), false, false, 0, 1); // reusable
        lib.insert_tclf(Id(5), CausalLink { source: Id(1), sink: Id(2), effect: Id(9), precondition: Id(10) }); // threats
        lib.insert_opf(Id(6), Id(7), false, true, 0, 0); // inits
        lib.insert_opf(Id(8), Id(9), true, false, 0, 0); // statics

        assert!(matches!(lib.next(), Some(Flaw::Opf { consumer, .. }) if consumer == Id(8)));
        assert!(matches!(lib.next(), Some(Flaw::Opf { consumer, .. }) if consumer == Id(6)));
        assert!(matches!(lib.next(), Some(Flaw::Tclf { .. })));
        assert!(matches!(lib.next(), Some(Flaw::Opf { consumer, .. }) if consumer == Id(3)));
        assert!(matches!(lib.next(), Some(Flaw::Opf { consumer, .. }) if consumer == Id(1)));
        assert!(lib.next().is_none());
    }

    #[test]
    fn empty_library_reports_empty() {
        let lib = FlawLibrary::new();
        assert!(lib.is_empty());
        assert_eq!(lib.len(), 0);
    }
}
