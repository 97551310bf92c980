// Copyright 2020 Graydon Hoare <graydon@pobox.com>
// Licensed under the MIT and Apache-2.0 licenses.

use crate::ids::{contains_all, deduplicate};
use crate::{OrderRequest, OrderState};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace};

/// Terminal transitions reached by a single `merge`. At most one of the two
/// is ever set.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The record just became `Inactive`: the order was served somewhere.
    pub newly_inactive: bool,
    /// The record just became `Confirmed`: the order may be served.
    pub newly_confirmed: bool,
}

impl MergeOutcome {
    fn inactive() -> Self {
        MergeOutcome {
            newly_inactive: true,
            newly_confirmed: false,
        }
    }

    fn confirmed() -> Self {
        MergeOutcome {
            newly_inactive: false,
            newly_confirmed: true,
        }
    }

    pub fn any(&self) -> bool {
        self.newly_inactive || self.newly_confirmed
    }
}

// Join `remote`'s acknowledgments with our own id. Note this replaces the
// local ack list rather than growing it: the remote list plus ourselves is
// what we now believe.
fn acknowledge<Peer: Clone + Eq + Hash>(remote: &[Peer], local_id: &Peer) -> Vec<Peer> {
    deduplicate(remote.iter().chain(std::iter::once(local_id)).cloned())
}

/// Reconcile our record for one order slot with a peer's record for the same
/// slot, returning the record we should now hold and any terminal transition
/// that happened along the way.
///
/// This is a gossip merge: nodes call it once per report they receive, in
/// any order and any number of times, and every reachable node converges.
/// A record becomes `Confirmed` either when a peer already reports
/// `Confirmed`, or when our own ack list covers every id in `peers`. A
/// `Confirmed` record is only dislodged by a peer reporting `Inactive`.
///
/// `peers` is the set of nodes whose acknowledgment is required. We always
/// add `local_id` to the ack list ourselves. A stale `peers` holding a dead
/// node blocks the local quorum path until the caller drops it.
///
/// Malformed input records are not checked.
pub fn merge<Peer>(
    local: &OrderRequest<Peer>,
    remote: &OrderRequest<Peer>,
    local_id: &Peer,
    peers: &[Peer],
) -> (OrderRequest<Peer>, MergeOutcome)
where
    Peer: Clone + Eq + Hash + Debug,
{
    use OrderState::*;
    let (next, outcome) = match (local.state, remote.state) {
        // Bootstrap: adopt whatever the peer knows.
        (Unknown, Inactive) => (OrderRequest::inactive(), MergeOutcome::inactive()),
        (Unknown, PendingAck) => (
            OrderRequest::pending(acknowledge(&remote.ack_by, local_id)),
            MergeOutcome::default(),
        ),
        (Unknown, Confirmed) => (
            OrderRequest::confirmed(acknowledge(&remote.ack_by, local_id)),
            MergeOutcome::confirmed(),
        ),
        (Unknown, Unknown) => (local.clone(), MergeOutcome::default()),

        (Inactive, PendingAck) => (
            OrderRequest::pending(acknowledge(&remote.ack_by, local_id)),
            MergeOutcome::default(),
        ),
        (Inactive, _) => (local.clone(), MergeOutcome::default()),

        // The confirmed record keeps the ack list it was formed with.
        (PendingAck, _) if remote.state == Confirmed || contains_all(&local.ack_by, peers) => (
            OrderRequest::confirmed(local.ack_by.clone()),
            MergeOutcome::confirmed(),
        ),
        (PendingAck, _) => (
            OrderRequest::pending(acknowledge(&remote.ack_by, local_id)),
            MergeOutcome::default(),
        ),

        (Confirmed, Inactive) => (OrderRequest::inactive(), MergeOutcome::inactive()),
        (Confirmed, _) => (local.clone(), MergeOutcome::default()),
    };

    trace!(
        "peer {:?} merged {:?} with remote {:?} -> {:?}",
        local_id,
        local.state,
        remote.state,
        next.state
    );
    if outcome.newly_confirmed {
        debug!("peer {:?} confirmed order, acked by {:?}", local_id, next.ack_by);
    }
    if outcome.newly_inactive {
        debug!("peer {:?} saw order resolved", local_id);
    }
    (next, outcome)
}
