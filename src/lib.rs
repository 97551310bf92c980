// Copyright 2020 Graydon Hoare <graydon@pobox.com>
// Licensed under the MIT and Apache-2.0 licenses.

/*!
 * This crate is the coordination core of a multi-car elevator controller. A
 * fixed set of nodes, each driving its own car, has to agree on which hall
 * and cab orders exist, who has seen them, and when they are served -- with
 * no leader and no shared store.
 *
 * It has two halves:
 *
 *   - A per-order gossip merge. Every node keeps an `OrderRequest` per order
 *     slot and folds in every copy a peer sends it with `merge`. An order
 *     starts `PendingAck` on the node where the button was pressed, collects
 *     acknowledgments as it spreads, becomes `Confirmed` once every live peer
 *     has acknowledged it (or once any peer says it is confirmed), and goes
 *     back to `Inactive` when some node serves it. The merge is pure and
 *     safe to repeat, so resending is the retry mechanism.
 *
 *   - A node-state aggregator. A single task relays the local car's coarse
 *     status outwards, keeps the last status heard from each peer, forgets
 *     peers reported lost, and publishes a snapshot of the whole view after
 *     each remote update, for whoever assigns orders to cars.
 *
 * Routing messages between nodes, detecting lost peers, and deciding how a
 * car moves are left to the client of this library. Liveness of the quorum
 * path depends entirely on the peer list handed to `merge` being accurate:
 * a dead node left in it stops orders from confirming locally.
 *
 * Byzantine peers, persistence across restarts, and membership changes
 * beyond "whatever peer list you pass in" are out of scope.
 */

mod aggregator;
pub mod ids;
mod merge;
mod order;
mod status;
mod table;

pub use aggregator::{
    Aggregator, AggregatorConfig, AggregatorError, AggregatorHandle, Event, NodeStates, Output,
    StatusView,
};
pub use merge::{merge, MergeOutcome};
pub use order::{OrderRequest, OrderState};
pub use status::{Behaviour, Direction, NodeStatus, StatusReport};
pub use table::{ButtonKind, OrderSlot, OrderSnapshot, OrderTable};
