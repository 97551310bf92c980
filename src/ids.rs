// Copyright 2020 Graydon Hoare <graydon@pobox.com>
// Licensed under the MIT and Apache-2.0 licenses.

//! Small helpers for treating a `Vec<Peer>` as a set. Acknowledgment lists
//! travel over the wire as sequences, so every mutation of one goes through
//! `deduplicate` to keep set semantics.

use itertools::Itertools;
use std::hash::Hash;

/// Remove duplicate peers, keeping the first occurrence of each. The result
/// is not sorted; nothing downstream cares about order.
pub fn deduplicate<Peer, I>(ids: I) -> Vec<Peer>
where
    Peer: Clone + Eq + Hash,
    I: IntoIterator<Item = Peer>,
{
    ids.into_iter().unique().collect()
}

pub fn contains<Peer: PartialEq>(set: &[Peer], id: &Peer) -> bool {
    set.iter().any(|p| p == id)
}

/// True iff every element of `subset` appears in `set`. An empty `subset` is
/// trivially contained.
pub fn contains_all<Peer: PartialEq>(set: &[Peer], subset: &[Peer]) -> bool {
    subset.iter().all(|id| contains(set, id))
}
