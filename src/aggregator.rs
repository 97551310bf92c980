// Copyright 2020 Graydon Hoare <graydon@pobox.com>
// Licensed under the MIT and Apache-2.0 licenses.

use crate::{NodeStatus, StatusReport};
use futures::channel::mpsc;
use futures::{select, SinkExt, StreamExt};
use im::OrdMap;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;
use tracing::{debug, trace};

/// The last status heard from every live node. Cloning is cheap and the
/// clone never observes later changes, so published views are stable.
pub type StatusView<Peer> = OrdMap<Peer, NodeStatus>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event<Peer> {
    /// Our own controller's status, to be relayed to the network.
    LocalStatus(NodeStatus),
    /// A peer's status, as received from the network.
    RemoteStatus(StatusReport<Peer>),
    /// The liveness detector lost this peer.
    NodeLost(Peer),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output<Peer: Ord + Clone> {
    PublishLocal(NodeStatus),
    PublishAll(StatusView<Peer>),
}

/// The aggregator's state machine, stripped of channels: feed it events
/// one at a time and forward whatever it returns. Keeping it separate from
/// the async loop means it can be stepped and inspected directly.
#[derive(Clone, Debug)]
pub struct NodeStates<Peer: Ord + Clone> {
    view: StatusView<Peer>,
}

impl<Peer: Ord + Clone> Default for NodeStates<Peer> {
    fn default() -> Self {
        NodeStates {
            view: OrdMap::new(),
        }
    }
}

impl<Peer: Ord + Clone + Debug> NodeStates<Peer> {
    pub fn new() -> Self {
        NodeStates::default()
    }

    pub fn view(&self) -> &StatusView<Peer> {
        &self.view
    }

    pub fn handle(&mut self, event: Event<Peer>) -> Option<Output<Peer>> {
        match event {
            Event::LocalStatus(status) => {
                trace!("relaying local status {:?}", status);
                Some(Output::PublishLocal(status))
            }
            Event::RemoteStatus(StatusReport { id, status }) => {
                trace!("peer {:?} reports {:?}", id, status);
                // Last write wins; a node is the only author of its own status.
                self.view.insert(id, status);
                Some(Output::PublishAll(self.view.clone()))
            }
            Event::NodeLost(id) => {
                if self.view.remove(&id).is_some() {
                    debug!("evicted lost peer {:?}", id);
                } else {
                    trace!("lost peer {:?} was not in the view", id);
                }
                None
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Buffer size of each bounded channel. A full outbound channel stalls
    /// the whole loop until its consumer catches up.
    pub channel_capacity: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        AggregatorConfig {
            channel_capacity: 16,
        }
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("local status consumer disconnected")]
    LocalStatusClosed,
    #[error("aggregate view consumer disconnected")]
    AllStatusesClosed,
}

/// The far ends of an `Aggregator`'s channels, for whoever wires it up.
pub struct AggregatorHandle<Peer: Ord + Clone> {
    pub local_status: mpsc::Sender<NodeStatus>,
    pub remote_status: mpsc::Sender<StatusReport<Peer>>,
    pub node_lost: mpsc::Sender<Peer>,
    pub publish_local: mpsc::Receiver<NodeStatus>,
    pub publish_all: mpsc::Receiver<StatusView<Peer>>,
}

/// `NodeStates` driven by channels. `run` is a plain future: spawn it on
/// whatever executor the rest of the node uses.
pub struct Aggregator<Peer: Ord + Clone> {
    states: NodeStates<Peer>,
    local_status: mpsc::Receiver<NodeStatus>,
    remote_status: mpsc::Receiver<StatusReport<Peer>>,
    node_lost: mpsc::Receiver<Peer>,
    publish_local: mpsc::Sender<NodeStatus>,
    publish_all: mpsc::Sender<StatusView<Peer>>,
}

impl<Peer: Ord + Clone + Debug> Aggregator<Peer> {
    pub fn with_channels(config: AggregatorConfig) -> (Self, AggregatorHandle<Peer>) {
        let cap = config.channel_capacity;
        let (local_tx, local_rx) = mpsc::channel(cap);
        let (remote_tx, remote_rx) = mpsc::channel(cap);
        let (lost_tx, lost_rx) = mpsc::channel(cap);
        let (publish_local_tx, publish_local_rx) = mpsc::channel(cap);
        let (publish_all_tx, publish_all_rx) = mpsc::channel(cap);
        let aggregator = Aggregator {
            states: NodeStates::new(),
            local_status: local_rx,
            remote_status: remote_rx,
            node_lost: lost_rx,
            publish_local: publish_local_tx,
            publish_all: publish_all_tx,
        };
        let handle = AggregatorHandle {
            local_status: local_tx,
            remote_status: remote_tx,
            node_lost: lost_tx,
            publish_local: publish_local_rx,
            publish_all: publish_all_rx,
        };
        (aggregator, handle)
    }

    /// Run until every inbound channel has closed. Each channel is
    /// consumed in order; there is no ordering between channels.
    pub async fn run(mut self) -> Result<(), AggregatorError> {
        loop {
            let event = select! {
                status = self.local_status.next() => status.map(Event::LocalStatus),
                report = self.remote_status.next() => report.map(Event::RemoteStatus),
                id = self.node_lost.next() => id.map(Event::NodeLost),
                complete => break,
            };
            // A `None` here is one inbound channel closing; the others may
            // still be live.
            if let Some(event) = event {
                self.step(event).await?;
            }
        }
        debug!("all inbound channels closed, aggregator stopping");
        Ok(())
    }

    async fn step(&mut self, event: Event<Peer>) -> Result<(), AggregatorError> {
        match self.states.handle(event) {
            Some(Output::PublishLocal(status)) => self
                .publish_local
                .send(status)
                .await
                .map_err(|_| AggregatorError::LocalStatusClosed),
            Some(Output::PublishAll(view)) => self
                .publish_all
                .send(view)
                .await
                .map_err(|_| AggregatorError::AllStatusesClosed),
            None => Ok(()),
        }
    }
}
