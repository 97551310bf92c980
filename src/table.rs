// Copyright 2020 Graydon Hoare <graydon@pobox.com>
// Licensed under the MIT and Apache-2.0 licenses.

use crate::{merge, MergeOutcome, OrderRequest, OrderState};
use im::OrdMap;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ButtonKind {
    HallUp,
    HallDown,
    Cab,
}

/// A physical order slot: one button at one floor. Each slot runs its own
/// independent agreement.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderSlot {
    pub floor: u8,
    pub button: ButtonKind,
}

impl OrderSlot {
    pub fn new(floor: u8, button: ButtonKind) -> Self {
        OrderSlot { floor, button }
    }
}

/// Everything one node believes about the orders in the system, keyed by
/// slot. Slots that were never touched are implicitly `Unknown`.
///
/// The table is the single writer for each of its records: it must be owned
/// by one task, which feeds it local button presses, local service
/// completions and peer snapshots, and gossips its own `snapshot` outwards.
#[derive(Clone, Debug)]
pub struct OrderTable<Peer: Clone> {
    local_id: Peer,
    orders: OrdMap<OrderSlot, OrderRequest<Peer>>,
}

pub type OrderSnapshot<Peer> = OrdMap<OrderSlot, OrderRequest<Peer>>;

impl<Peer: Clone + Eq + Hash + Debug> OrderTable<Peer> {
    pub fn new(local_id: Peer) -> Self {
        OrderTable {
            local_id,
            orders: OrdMap::new(),
        }
    }

    pub fn local_id(&self) -> &Peer {
        &self.local_id
    }

    pub fn get(&self, slot: &OrderSlot) -> OrderRequest<Peer> {
        self.orders.get(slot).cloned().unwrap_or_default()
    }

    /// A button was pressed here. Starts gathering acknowledgments if the
    /// slot is not already requested; returns whether anything changed.
    pub fn request(&mut self, slot: OrderSlot) -> bool {
        match self.get(&slot).state {
            OrderState::Unknown | OrderState::Inactive => {
                debug!("peer {:?} requesting {:?}", self.local_id, slot);
                self.orders
                    .insert(slot, OrderRequest::pending(vec![self.local_id.clone()]));
                true
            }
            OrderState::PendingAck | OrderState::Confirmed => false,
        }
    }

    /// The order was served here. Only a confirmed order can be served;
    /// returns whether anything changed.
    pub fn resolve(&mut self, slot: OrderSlot) -> bool {
        if !self.get(&slot).is_confirmed() {
            return false;
        }
        debug!("peer {:?} resolved {:?}", self.local_id, slot);
        self.orders.insert(slot, OrderRequest::inactive());
        true
    }

    pub fn merge_remote(
        &mut self,
        slot: OrderSlot,
        remote: &OrderRequest<Peer>,
        peers: &[Peer],
    ) -> MergeOutcome {
        let local = self.get(&slot);
        let (next, outcome) = merge(&local, remote, &self.local_id, peers);
        if next != local {
            trace!("peer {:?} updated {:?} to {:?}", self.local_id, slot, next.state);
            self.orders.insert(slot, next);
        }
        outcome
    }

    /// Merge every slot of a peer's snapshot into ours. Returns the slots
    /// whose merge produced a terminal transition, in slot order.
    pub fn merge_table(
        &mut self,
        remote: &OrderSnapshot<Peer>,
        peers: &[Peer],
    ) -> Vec<(OrderSlot, MergeOutcome)> {
        let mut changed = Vec::new();
        for (slot, record) in remote.iter() {
            let outcome = self.merge_remote(*slot, record, peers);
            if outcome.any() {
                changed.push((*slot, outcome));
            }
        }
        changed
    }

    /// Slots that may be served, i.e. whose light should be on.
    pub fn confirmed(&self) -> impl Iterator<Item = OrderSlot> + '_ {
        self.orders
            .iter()
            .filter(|(_, r)| r.is_confirmed())
            .map(|(slot, _)| *slot)
    }

    /// An immutable copy of every record, for gossiping to peers.
    pub fn snapshot(&self) -> OrderSnapshot<Peer> {
        self.orders.clone()
    }
}
