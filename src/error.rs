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

//! Module containing all error types.
//!
//! Only failures that make a `Domain`/`Problem` pair unplannable at construction time are
//! represented as [`Error`] variants. A search that simply fails to find a plan is not an
//! error: it is a successful, if empty, [`crate::search::SearchReport`]. Likewise a single
//! refinement call returning `false` just prunes one candidate child; it never bubbles up
//! as an `Err`.

use thiserror::Error;

/// Main error type, covering only fatal-at-construction input inconsistencies.
///
/// Invariant violations discovered once a search is running (a cycle slipping past
/// `add_edge`, a variable grounded twice, a negative-area polygon) are programmer errors in
/// this crate, not caller-facing failures, and are reported via `panic!`/`debug_assert!`
/// at the call site instead of through this enum.
#[derive(Debug, Error)]
pub enum Error {
    /// The domain and problem were not built for each other.
    #[error("domain `{domain}` does not match problem's declared domain `{problem}`")]
    DomainProblemMismatch {
        /// Name carried by the `Domain`.
        domain: String,
        /// Name the `Problem` declares it was written against.
        problem: String,
    },
    /// A type was declared as both a symbolic and a geometric type.
    #[error("type `{0}` is tagged as both symbolic and geometric")]
    MixedTypeTag(String),
    /// An object of a physical type has no area registered for its reach.
    #[error("object `{0}` has no reach area on record")]
    MissingReachArea(String),
    /// An object of a physical type has no width/length dimensions on record.
    #[error("object `{0}` has no dimensions on record")]
    ObjectWithoutDimensions(String),
    /// A robot referenced by a reach pair is not present among the problem's objects.
    #[error("robot `{0}` referenced by a reach constraint is not a known object")]
    UnknownRobot(String),
    /// An area referenced by the problem is not present in its area map.
    #[error("area `{0}` is not declared among the problem's areas")]
    UnknownArea(String),
}
