//! The router: one routing table behind a lock, fed by inbound updates and
//! drained by periodic advertisements.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::cidr::Cidr;
use crate::destination::PeerAddr;
use crate::error::RoutingError;
use crate::liveness::purge_neighbor;
use crate::message::{encode_table, RouterSnapshot, UpdateMessage};
use crate::table::RoutingTable;
use crate::transport::Transport;
use crate::update;
use crate::view::build_view;
use crate::Cost;

/// Static identity and neighborhood of a router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Address neighbors use to reach this router, e.g. `127.0.0.1:5000`.
    pub address: PeerAddr,
    /// The network this router originates.
    pub network: Cidr,
    /// Configured neighbors and their direct link costs.
    pub neighbors: BTreeMap<PeerAddr, Cost>,
    pub update_interval: Duration,
}

impl RouterConfig {
    /// Validate and build a configuration.
    pub fn new(
        address: PeerAddr,
        network: Cidr,
        neighbors: BTreeMap<PeerAddr, Cost>,
        update_interval: Duration,
    ) -> Result<Self, RoutingError> {
        if update_interval.is_zero() {
            return Err(RoutingError::InvalidConfig(
                "update interval must be positive".into(),
            ));
        }
        for (neighbor, &cost) in &neighbors {
            if cost == 0 {
                return Err(RoutingError::InvalidLinkCost {
                    neighbor: neighbor.to_string(),
                    cost,
                });
            }
            if *neighbor == address {
                return Err(RoutingError::InvalidConfig(format!(
                    "router {address} lists itself as a neighbor"
                )));
            }
        }
        Ok(Self {
            address,
            network,
            neighbors,
            update_interval,
        })
    }
}

/// A distance-vector router.
///
/// All table access goes through one mutex. The lock is never held across an
/// `.await`: views are built and cloned under the lock, then sent after it
/// is released.
pub struct Router<T> {
    config: RouterConfig,
    table: Mutex<RoutingTable>,
    transport: T,
}

impl<T: Transport> Router<T> {
    pub fn new(config: RouterConfig, transport: T) -> Self {
        let table = RoutingTable::with_neighbors(
            config.network,
            config.neighbors.iter().map(|(addr, &cost)| (addr, cost)),
        );
        tracing::info!(
            address = %config.address,
            network = %config.network,
            neighbors = config.neighbors.len(),
            "router created"
        );
        Self {
            config,
            table: Mutex::new(table),
            transport,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn address(&self) -> &PeerAddr {
        &self.config.address
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // A panicked holder cannot leave the table half-updated in a way that
    // breaks its invariants, so a poisoned lock is recovered.
    fn lock_table(&self) -> MutexGuard<'_, RoutingTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current routing table.
    pub fn routing_table(&self) -> RoutingTable {
        self.lock_table().clone()
    }

    /// Apply an update received from a neighbor. Returns whether the table
    /// changed.
    pub fn handle_update(&self, message: &UpdateMessage) -> Result<bool, RoutingError> {
        let sender = message.sender()?;
        let link_cost = *self
            .config
            .neighbors
            .get(&sender)
            .ok_or_else(|| RoutingError::UnknownNeighbor(sender.to_string()))?;
        let routes = message.routes();

        let mut table = self.lock_table();
        let changed = update::apply(
            &mut table,
            &self.config.address,
            &sender,
            routes.iter().map(|(dest, &cost)| (dest, cost)),
            link_cost,
        );

        if changed {
            log_table(&self.config.address, &table, "routing table updated");
        } else {
            tracing::debug!(sender = %sender, "update brought no changes");
        }
        Ok(changed)
    }

    /// The table this router would advertise to `neighbor` right now.
    pub fn view_for(&self, neighbor: &PeerAddr) -> RoutingTable {
        build_view(&self.lock_table(), neighbor)
    }

    /// Withdraw everything that depends on `neighbor`. Returns the number of
    /// entries removed.
    pub fn handle_delivery_failure(&self, neighbor: &PeerAddr) -> usize {
        let mut table = self.lock_table();
        let removed = purge_neighbor(&mut table, neighbor, self.config.neighbors.keys());
        if removed > 0 {
            log_table(&self.config.address, &table, "routing table after purge");
        }
        removed
    }

    /// Send one round of advertisements to every configured neighbor.
    ///
    /// Deliveries run concurrently. Each failed delivery triggers one purge
    /// of that neighbor. Returns the number of failed deliveries.
    pub async fn advertise(&self) -> usize {
        let outbound: Vec<(PeerAddr, UpdateMessage)> = {
            let table = self.lock_table();
            self.config
                .neighbors
                .keys()
                .map(|neighbor| {
                    let view = build_view(&table, neighbor);
                    (
                        neighbor.clone(),
                        UpdateMessage::new(&self.config.address, &view),
                    )
                })
                .collect()
        };

        let results = join_all(outbound.iter().map(|(neighbor, message)| async move {
            (neighbor, self.transport.deliver(neighbor, message).await)
        }))
        .await;

        let mut failures = 0;
        for (neighbor, result) in results {
            match result {
                Ok(()) => tracing::debug!(neighbor = %neighbor, "update delivered"),
                Err(e) => {
                    failures += 1;
                    tracing::warn!(neighbor = %neighbor, error = %e, "update delivery failed");
                    self.handle_delivery_failure(neighbor);
                }
            }
        }
        failures
    }

    /// Advertise every `update_interval`, forever. The first round goes out
    /// one interval after the call.
    pub async fn run_periodic(&self) {
        let period = self.config.update_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            tracing::debug!(address = %self.config.address, "periodic advertisement");
            self.advertise().await;
        }
    }

    pub fn snapshot(&self) -> RouterSnapshot {
        let routing_table = encode_table(&self.lock_table());
        RouterSnapshot {
            routing_table,
            neighbors: self
                .config
                .neighbors
                .iter()
                .map(|(addr, &cost)| (addr.to_string(), cost))
                .collect(),
            my_network: self.config.network.to_string(),
            my_address: self.config.address.to_string(),
            update_interval: self.config.update_interval.as_secs(),
        }
    }
}

fn log_table(address: &PeerAddr, table: &RoutingTable, msg: &str) {
    let rendered = serde_json::to_string(&encode_table(table)).unwrap_or_default();
    tracing::info!(address = %address, routes = table.size(), table = %rendered, "{msg}");
}
