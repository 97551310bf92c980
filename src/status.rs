// Copyright 2020 Graydon Hoare <graydon@pobox.com>
// Licensed under the MIT and Apache-2.0 licenses.

use serde::{Deserialize, Serialize};

/// What the car is doing, as reported by its movement/door controller.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Behaviour {
    Initializing, // Finding a floor after power-up.
    Idle,
    DoorOpen,
    Moving,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

/// Coarse snapshot of one node's controller. Consensus never looks inside
/// it; the aggregator only copies it around.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub behaviour: Behaviour,
    pub floor: u8,
    pub direction: Direction,
}

impl NodeStatus {
    pub fn new(behaviour: Behaviour, floor: u8, direction: Direction) -> Self {
        NodeStatus {
            behaviour,
            floor,
            direction,
        }
    }
}

/// A status as it arrives from the network: who it is about, and the
/// status itself. A node only ever reports about its own id.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport<Peer> {
    pub id: Peer,
    pub status: NodeStatus,
}
