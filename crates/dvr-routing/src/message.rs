//! Wire shapes exchanged between routers and exposed for inspection.
//!
//! Payload: `{"sender_address": "...", "routing_table": {"<id>": {"cost": n, "next_hop": "..."}}}`.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::destination::{Destination, NextHop, PeerAddr};
use crate::error::RoutingError;
use crate::table::RoutingTable;
use crate::{Cost, UNREACHABLE};

/// One route as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRoute {
    #[serde(deserialize_with = "saturating_cost")]
    pub cost: Cost,
    pub next_hop: String,
}

/// Costs beyond the local range read as unreachable instead of failing the
/// whole message.
fn saturating_cost<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cost, D::Error> {
    let raw = u64::deserialize(deserializer)?;
    Ok(Cost::try_from(raw).unwrap_or(UNREACHABLE))
}

/// A routing table as carried on the wire, keyed by identifier string.
pub type WireTable = BTreeMap<String, WireRoute>;

/// Encode a table for the wire. The self route's next hop is the network's
/// own identifier.
pub fn encode_table(table: &RoutingTable) -> WireTable {
    table
        .iter()
        .map(|(dest, entry)| {
            let next_hop = match &entry.next_hop {
                NextHop::Local => dest.to_string(),
                NextHop::Via(addr) => addr.to_string(),
            };
            (
                dest.to_string(),
                WireRoute {
                    cost: entry.cost,
                    next_hop,
                },
            )
        })
        .collect()
}

/// A routing update sent from one router to a neighbor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMessage {
    pub sender_address: String,
    pub routing_table: WireTable,
}

impl UpdateMessage {
    pub fn new(sender: &PeerAddr, table: &RoutingTable) -> Self {
        Self {
            sender_address: sender.to_string(),
            routing_table: encode_table(table),
        }
    }

    /// Decode a JSON payload. Missing fields or wrong types reject the whole
    /// message.
    pub fn from_json(bytes: &[u8]) -> Result<Self, RoutingError> {
        serde_json::from_slice(bytes).map_err(|e| RoutingError::MalformedMessage(e.to_string()))
    }

    /// The validated sender address.
    pub fn sender(&self) -> Result<PeerAddr, RoutingError> {
        PeerAddr::new(self.sender_address.as_str()).map_err(|e| {
            RoutingError::MalformedMessage(format!("invalid sender_address: {e}"))
        })
    }

    /// Advertised destinations and costs. Entries whose identifier does not
    /// parse are skipped; the rest of the message is still used. Two
    /// spellings of the same identifier keep the lower cost.
    pub fn routes(&self) -> BTreeMap<Destination, Cost> {
        let mut routes = BTreeMap::new();
        for (id, route) in &self.routing_table {
            let dest = match Destination::parse(id) {
                Ok(dest) => dest,
                Err(e) => {
                    tracing::warn!(
                        sender = %self.sender_address,
                        error = %e,
                        "rejected advertised route"
                    );
                    continue;
                }
            };
            match routes.entry(dest) {
                Entry::Vacant(slot) => {
                    slot.insert(route.cost);
                }
                Entry::Occupied(mut slot) => {
                    if route.cost < *slot.get() {
                        slot.insert(route.cost);
                    }
                }
            }
        }
        routes
    }
}

/// Read-only view of a router for debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterSnapshot {
    pub routing_table: WireTable,
    pub neighbors: BTreeMap<String, Cost>,
    pub my_network: String,
    pub my_address: String,
    /// Seconds between periodic advertisements.
    pub update_interval: u64,
}
