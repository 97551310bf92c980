// Copyright 2020 Graydon Hoare <graydon@pobox.com>
// Licensed under the MIT and Apache-2.0 licenses.

use crate::{merge, MergeOutcome};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Lifecycle of a single replicated order. `Unknown` only exists before a
/// node has heard anything about the slot; the first merge that carries
/// information moves it out and it never comes back.
///
/// The derived ordering follows the lifecycle, but note the lifecycle is a
/// cycle (`Confirmed` returns to `Inactive`), so this is not a lattice.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderState {
    Unknown,    // Nothing heard yet.
    Inactive,   // Not requested, or served.
    PendingAck, // Requested, collecting acknowledgments.
    Confirmed,  // Every live peer has acknowledged.
}

impl Default for OrderState {
    fn default() -> Self {
        OrderState::Unknown
    }
}

/// One node's belief about one order slot. `ack_by` is a set stored as a
/// sequence: it never holds duplicates and its order means nothing. It is
/// empty in `Unknown` and `Inactive`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest<Peer> {
    pub state: OrderState,
    pub ack_by: Vec<Peer>,
}

impl<Peer> Default for OrderRequest<Peer> {
    fn default() -> Self {
        OrderRequest::unknown()
    }
}

impl<Peer> OrderRequest<Peer> {
    pub fn unknown() -> Self {
        OrderRequest {
            state: OrderState::Unknown,
            ack_by: Vec::new(),
        }
    }

    pub fn inactive() -> Self {
        OrderRequest {
            state: OrderState::Inactive,
            ack_by: Vec::new(),
        }
    }

    pub fn pending(ack_by: Vec<Peer>) -> Self {
        OrderRequest {
            state: OrderState::PendingAck,
            ack_by,
        }
    }

    pub fn confirmed(ack_by: Vec<Peer>) -> Self {
        OrderRequest {
            state: OrderState::Confirmed,
            ack_by,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == OrderState::Confirmed
    }
}

impl<Peer: Clone + Eq + Hash + Debug> OrderRequest<Peer> {
    /// Fold `remote` into `self`, replacing it with the merged record.
    /// Callers owning a single slot can use this instead of storing the
    /// result of `merge` by hand.
    pub fn merge_from(&mut self, remote: &Self, local_id: &Peer, peers: &[Peer]) -> MergeOutcome {
        let (next, outcome) = merge(self, remote, local_id, peers);
        *self = next;
        outcome
    }
}
